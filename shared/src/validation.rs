use chrono_tz::Tz;
use validator::ValidationErrors;

use crate::error::{PrayerError, PrayerResult};

/// Resolves an IANA zone name (e.g. `Asia/Tehran`) against the bundled tz database.
pub fn resolve_timezone(timezone: &str) -> PrayerResult<Tz> {
    let timezone = timezone.trim();
    timezone
        .parse::<Tz>()
        .map_err(|_| PrayerError::InvalidTimeZone(format!("Unknown timezone name: {}", timezone)))
}

pub fn validate_timezone(timezone: &str) -> PrayerResult<()> {
    resolve_timezone(timezone).map(|_| ())
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid value for field '{}'", field))
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}
