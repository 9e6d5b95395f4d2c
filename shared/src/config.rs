use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Calculation settings. `method` and `school` are preset names resolved by the
/// calculator crate; the numeric fields override the preset when present.
#[derive(Debug, Deserialize, Clone)]
pub struct CalculatorSettings {
    pub method: String,
    pub school: String,
    pub fajr_angle: Option<f64>,
    pub isha_angle: Option<f64>,
    pub maghrib_offset_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationSettings {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub cities_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub pattern: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub calculator: CalculatorSettings,
    pub location: LocationSettings,
    pub output: OutputSettings,
    pub date: Option<String>,
    pub days: u16,
    pub rust_log: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("calculator.method", "tehran")?
            .set_default("calculator.school", "standard")?
            .set_default("location.city", "tehran")?
            .set_default("output.format", "table")?
            .set_default("output.pattern", "%H:%M")?
            .set_default("days", 1)?
            .set_default("rust_log", "info")
    }
}
