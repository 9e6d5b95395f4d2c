use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrayerError {
    #[error("Invalid timezone: {0}")]
    InvalidTimeZone(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Date parsing error: {0}")]
    DateParsing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for PrayerError {
    fn from(err: validator::ValidationErrors) -> Self {
        PrayerError::Validation(crate::validation::format_validation_errors(&err))
    }
}

impl From<chrono::ParseError> for PrayerError {
    fn from(err: chrono::ParseError) -> Self {
        PrayerError::DateParsing(format!("Invalid date format: {}", err))
    }
}

// Convenience constructors for common error patterns
impl PrayerError {
    pub fn invalid_time_zone<T: std::fmt::Display>(zone: T) -> Self {
        PrayerError::InvalidTimeZone(zone.to_string())
    }

    pub fn validation<T: std::fmt::Display>(message: T) -> Self {
        PrayerError::Validation(message.to_string())
    }

    pub fn not_found<T: std::fmt::Display>(resource: T) -> Self {
        PrayerError::NotFound(format!("{} not found", resource))
    }

    pub fn date_out_of_range<T: std::fmt::Display>(message: T) -> Self {
        PrayerError::DateOutOfRange(message.to_string())
    }

    pub fn internal<T: std::fmt::Display>(message: T) -> Self {
        PrayerError::Internal(anyhow::anyhow!(message.to_string()))
    }
}

pub type PrayerResult<T> = Result<T, PrayerError>;
