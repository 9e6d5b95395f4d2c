use std::fs::File;

use chrono::{Duration, NaiveDate};
use dotenv::dotenv;
use prayer_times::services::LocalClock;
use prayer_times::{
    CalculationMethod, CalculatorConfig, CityDirectory, Location, PrayerTimeCalculator,
    PrayerTimeSet, School,
};
use serde::Serialize;
use shared::{
    config::{AppConfig, CalculatorSettings, OutputFormat},
    error::{PrayerError, PrayerResult},
};
use tracing::{debug, info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Serialize)]
struct Timetable<'a> {
    place: &'a str,
    location: &'a Location,
    settings: &'a CalculatorConfig,
    days: &'a [PrayerTimeSet],
}

fn main() -> PrayerResult<()> {
    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(config.rust_log.as_deref().unwrap_or("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        PrayerError::internal(format!("Failed to set tracing subscriber: {}", e))
    })?;
    info!("Configuration loaded successfully");

    let settings = calculator_config(&config.calculator)?;
    let calculator = PrayerTimeCalculator::try_new(settings)?;
    debug!("Calculator settings: {:?}", settings);

    let (place, location) = resolve_location(&config)?;
    let start = match config.date.as_deref() {
        Some(date) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?,
        None => LocalClock::today(location.time_zone()?),
    };

    info!(
        "Calculating {} day(s) from {} for {} ({:.4}, {:.4})",
        config.days, start, place, location.latitude, location.longitude
    );
    let days = calculator.calculate_days(start, config.days, &location)?;

    match config.output.format {
        OutputFormat::Json => {
            let timetable = Timetable {
                place: &place,
                location: &location,
                settings: &settings,
                days: &days,
            };
            println!("{}", serde_json::to_string_pretty(&timetable)?);
        }
        OutputFormat::Table => print_table(&place, start, &days, &config.output.pattern)?,
    }

    Ok(())
}

fn calculator_config(settings: &CalculatorSettings) -> PrayerResult<CalculatorConfig> {
    let method: CalculationMethod = settings.method.parse()?;
    let school: School = settings.school.parse()?;

    let mut config = method.to_config().with_school(school);
    if let Some(angle) = settings.fajr_angle {
        config.fajr_angle = angle;
    }
    if let Some(angle) = settings.isha_angle {
        config.isha_angle = angle;
    }
    if let Some(minutes) = settings.maghrib_offset_minutes {
        config.maghrib_offset_minutes = minutes;
    }

    Ok(config)
}

fn resolve_location(config: &AppConfig) -> PrayerResult<(String, Location)> {
    let settings = &config.location;

    if let (Some(latitude), Some(longitude)) = (settings.latitude, settings.longitude) {
        let timezone = settings.timezone.clone().ok_or_else(|| {
            PrayerError::validation("location.timezone is required with explicit coordinates")
        })?;
        let location = Location::new(latitude, longitude, timezone)?;
        return Ok((format!("{:.4}, {:.4}", latitude, longitude), location));
    }

    let directory = match settings.cities_file.as_deref() {
        Some(path) => CityDirectory::from_csv(File::open(path)?)?,
        None => CityDirectory::builtin(),
    };
    let name = settings
        .city
        .as_deref()
        .ok_or_else(|| PrayerError::validation("Either location.city or coordinates are required"))?;

    let city = directory.get(name)?;
    Ok((
        format!("{} ({})", city.display_name(), city.persian_name),
        city.location()?,
    ))
}

fn print_table(place: &str, start: NaiveDate, days: &[PrayerTimeSet], pattern: &str) -> PrayerResult<()> {
    println!("Prayer times for {}", place);
    for (index, times) in days.iter().enumerate() {
        let date = start + Duration::days(index as i64);
        println!();
        println!("{}", date.format("%A %Y-%m-%d"));
        for (prayer, time) in times.format_all(pattern)? {
            println!("  {:<9} {}", format!("{}:", prayer), time);
        }
    }
    Ok(())
}
