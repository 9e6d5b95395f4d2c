use std::fmt;

use chrono::format::{Item, StrftimeItems};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::error::{PrayerError, PrayerResult};
use shared::validation::{resolve_timezone, validate_timezone};
use validator::{Validate, ValidationError};

/// Asr shadow convention.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum School {
    /// Shafii, Maliki, Hanbali: shadow equals object height.
    Standard,
    /// Shadow equals twice the object height.
    Hanafi,
}

impl School {
    pub fn shadow_factor(self) -> f64 {
        match self {
            School::Standard => 1.0,
            School::Hanafi => 2.0,
        }
    }
}

impl Default for School {
    fn default() -> Self {
        School::Standard
    }
}

impl std::str::FromStr for School {
    type Err = PrayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "shafii" => Ok(School::Standard),
            "hanafi" => Ok(School::Hanafi),
            other => Err(PrayerError::validation(format!("Unknown school: {}", other))),
        }
    }
}

/// Twilight-angle presets. Only angle-based conventions are listed.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    /// Institute of Geophysics, University of Tehran
    Tehran,
    /// Shia Ithna Ashari, Leva Institute, Qum
    Jafari,
    /// Muslim World League
    Mwl,
    /// Islamic Society of North America
    Isna,
    /// Egyptian General Authority of Survey
    Egypt,
    /// University of Islamic Sciences, Karachi
    Karachi,
}

impl CalculationMethod {
    pub fn to_config(self) -> CalculatorConfig {
        let base = CalculatorConfig::default();
        match self {
            Self::Tehran => base,
            Self::Jafari => CalculatorConfig {
                fajr_angle: 16.0,
                isha_angle: 14.0,
                ..base
            },
            Self::Mwl => CalculatorConfig {
                fajr_angle: 18.0,
                isha_angle: 17.0,
                maghrib_offset_minutes: 0,
                ..base
            },
            Self::Isna => CalculatorConfig {
                fajr_angle: 15.0,
                isha_angle: 15.0,
                maghrib_offset_minutes: 0,
                ..base
            },
            Self::Egypt => CalculatorConfig {
                fajr_angle: 19.5,
                isha_angle: 17.5,
                maghrib_offset_minutes: 0,
                ..base
            },
            Self::Karachi => CalculatorConfig {
                fajr_angle: 18.0,
                isha_angle: 18.0,
                maghrib_offset_minutes: 0,
                ..base
            },
        }
    }
}

impl std::str::FromStr for CalculationMethod {
    type Err = PrayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tehran" => Ok(Self::Tehran),
            "jafari" => Ok(Self::Jafari),
            "mwl" => Ok(Self::Mwl),
            "isna" => Ok(Self::Isna),
            "egypt" => Ok(Self::Egypt),
            "karachi" => Ok(Self::Karachi),
            other => Err(PrayerError::validation(format!(
                "Unknown calculation method: {}",
                other
            ))),
        }
    }
}

/// Parameters that fully determine a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Validate)]
pub struct CalculatorConfig {
    /// Sun depression below the horizon at Fajr, degrees.
    #[validate(range(min = 0.0, max = 90.0, message = "Fajr angle must be between 0 and 90 degrees"))]
    pub fajr_angle: f64,

    /// Sun depression below the horizon at Isha, degrees.
    #[validate(range(min = 0.0, max = 90.0, message = "Isha angle must be between 0 and 90 degrees"))]
    pub isha_angle: f64,

    /// Apparent altitude of the sun's centre at sunrise and sunset, degrees.
    #[validate(range(min = -90.0, max = 90.0, message = "Sunrise/sunset altitude must be between -90 and 90 degrees"))]
    pub sunrise_sunset_altitude: f64,

    #[validate(range(min = 0.0, max = 10.0, message = "Asr shadow factor must be between 0 and 10"))]
    pub asr_shadow_factor: f64,

    #[validate(range(min = 0, max = 180, message = "Maghrib offset must be between 0 and 180 minutes"))]
    pub maghrib_offset_minutes: i64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            fajr_angle: 17.7,
            isha_angle: 14.0,
            sunrise_sunset_altitude: -0.833,
            asr_shadow_factor: 1.0,
            maghrib_offset_minutes: 21,
        }
    }
}

impl CalculatorConfig {
    pub fn with_school(self, school: School) -> Self {
        Self {
            asr_shadow_factor: school.shadow_factor(),
            ..self
        }
    }

    /// Validates every field, rejecting NaN angles as well.
    pub fn validated(self) -> PrayerResult<Self> {
        self.validate()?;
        let angles = [
            self.fajr_angle,
            self.isha_angle,
            self.sunrise_sunset_altitude,
            self.asr_shadow_factor,
        ];
        if angles.iter().any(|a| a.is_nan()) {
            return Err(PrayerError::validation("Calculator angles must be numbers"));
        }
        Ok(self)
    }
}

/// Geographic position plus the IANA zone its clocks follow.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90 degrees"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180 degrees"))]
    pub longitude: f64,

    #[validate(custom = "validate_timezone_field")]
    pub timezone: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timezone: impl Into<String>) -> PrayerResult<Self> {
        let location = Self {
            latitude,
            longitude,
            timezone: timezone.into(),
        };
        location.validate()?;
        if location.latitude.is_nan() || location.longitude.is_nan() {
            return Err(PrayerError::validation("Coordinates must be numbers"));
        }
        Ok(location)
    }

    pub fn time_zone(&self) -> PrayerResult<Tz> {
        resolve_timezone(&self.timezone)
    }
}

fn validate_timezone_field(timezone: &str) -> Result<(), ValidationError> {
    validate_timezone(timezone).map_err(|_| ValidationError::new("invalid_timezone"))
}

/// Solar position summary for one Julian day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarParameters {
    /// Radians.
    pub declination: f64,
    /// Apparent minus mean solar time, minutes.
    pub equation_of_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Sunset,
    Maghrib,
    Isha,
    Midnight,
}

impl Prayer {
    /// All slots in chronological order.
    pub const ALL: [Prayer; 8] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Sunset,
        Prayer::Maghrib,
        Prayer::Isha,
        Prayer::Midnight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Sunset => "Sunset",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
            Prayer::Midnight => "Midnight",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The eight times of one day, all in the location's zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimeSet {
    pub fajr: DateTime<Tz>,
    pub sunrise: DateTime<Tz>,
    pub dhuhr: DateTime<Tz>,
    pub asr: DateTime<Tz>,
    pub sunset: DateTime<Tz>,
    pub maghrib: DateTime<Tz>,
    pub isha: DateTime<Tz>,
    /// Midpoint of sunset and the next day's Fajr; usually after local midnight.
    pub midnight: DateTime<Tz>,
}

impl PrayerTimeSet {
    pub fn get(&self, prayer: Prayer) -> DateTime<Tz> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Sunset => self.sunset,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
            Prayer::Midnight => self.midnight,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prayer, DateTime<Tz>)> + '_ {
        Prayer::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// True when every time is strictly later than the one before it, except
    /// that Maghrib may coincide with sunset.
    pub fn is_ordered(&self) -> bool {
        self.fajr < self.sunrise
            && self.sunrise < self.dhuhr
            && self.dhuhr < self.asr
            && self.asr < self.sunset
            && self.sunset <= self.maghrib
            && self.maghrib < self.isha
            && self.sunset <= self.midnight
    }

    /// Formats every time with a strftime pattern such as `%H:%M:%S`.
    pub fn format_all(&self, pattern: &str) -> PrayerResult<Vec<(Prayer, String)>> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(PrayerError::validation(format!(
                "Invalid time pattern: {}",
                pattern
            )));
        }

        Ok(self
            .iter()
            .map(|(prayer, time)| {
                (
                    prayer,
                    time.format_with_items(items.iter()).to_string(),
                )
            })
            .collect())
    }
}

impl fmt::Display for PrayerTimeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prayer Times:")?;
        for (prayer, time) in self.iter() {
            writeln!(f, "{:<9} {}", format!("{}:", prayer), time.format("%H:%M"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_set() -> PrayerTimeSet {
        let tz = Tz::Asia__Tehran;
        let at = |h, m, s| tz.with_ymd_and_hms(2024, 6, 21, h, m, s).unwrap();
        PrayerTimeSet {
            fajr: at(3, 2, 15),
            sunrise: at(4, 48, 59),
            dhuhr: at(12, 6, 16),
            asr: at(15, 55, 23),
            sunset: at(19, 23, 33),
            maghrib: at(19, 44, 33),
            isha: at(20, 44, 14),
            midnight: at(23, 13, 1),
        }
    }

    #[test]
    fn test_default_config() {
        let config = CalculatorConfig::default();
        assert_eq!(config.fajr_angle, 17.7);
        assert_eq!(config.isha_angle, 14.0);
        assert_eq!(config.sunrise_sunset_altitude, -0.833);
        assert_eq!(config.asr_shadow_factor, 1.0);
        assert_eq!(config.maghrib_offset_minutes, 21);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = CalculatorConfig {
            fajr_angle: 120.0,
            ..Default::default()
        };
        let err = bad.validated().unwrap_err();
        assert!(matches!(err, PrayerError::Validation(_)));
        assert!(err.to_string().contains("Fajr angle"));

        let negative_offset = CalculatorConfig {
            maghrib_offset_minutes: -5,
            ..Default::default()
        };
        assert!(negative_offset.validated().is_err());

        let nan = CalculatorConfig {
            isha_angle: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validated().is_err());
    }

    #[test]
    fn test_school_and_methods() {
        assert_eq!(School::default().shadow_factor(), 1.0);
        assert_eq!(
            CalculatorConfig::default()
                .with_school(School::Hanafi)
                .asr_shadow_factor,
            2.0
        );
        assert_eq!("HANAFI".parse::<School>().unwrap(), School::Hanafi);
        assert!("maliki-ish".parse::<School>().is_err());

        assert_eq!(CalculationMethod::Tehran.to_config(), CalculatorConfig::default());
        let mwl = "mwl".parse::<CalculationMethod>().unwrap().to_config();
        assert_eq!(mwl.fajr_angle, 18.0);
        assert_eq!(mwl.isha_angle, 17.0);
        assert_eq!(mwl.maghrib_offset_minutes, 0);
        assert!("umm-al-qura".parse::<CalculationMethod>().is_err());
    }

    #[test]
    fn test_location_validation() {
        let tehran = Location::new(35.6892, 51.3890, "Asia/Tehran").unwrap();
        assert_eq!(tehran.time_zone().unwrap(), Tz::Asia__Tehran);

        assert!(Location::new(95.0, 51.0, "Asia/Tehran").is_err());
        assert!(Location::new(35.0, -181.0, "Asia/Tehran").is_err());
        assert!(Location::new(f64::NAN, 51.0, "Asia/Tehran").is_err());
        assert!(Location::new(35.0, f64::NAN, "Asia/Tehran").is_err());
        assert!(Location::new(-90.0, 180.0, "UTC").is_ok());

        let err = Location::new(35.0, 51.0, "Asia/Atlantis").unwrap_err();
        assert!(matches!(err, PrayerError::Validation(_)));
    }

    #[test]
    fn test_time_set_order_and_lookup() {
        let set = sample_set();
        assert!(set.is_ordered());
        assert_eq!(set.get(Prayer::Asr), set.asr);

        let names: Vec<&str> = set.iter().map(|(p, _)| p.name()).collect();
        assert_eq!(
            names,
            ["Fajr", "Sunrise", "Dhuhr", "Asr", "Sunset", "Maghrib", "Isha", "Midnight"]
        );
    }

    #[test]
    fn test_format_all() {
        let formatted = sample_set().format_all("%H:%M:%S").unwrap();
        assert_eq!(formatted[0], (Prayer::Fajr, "03:02:15".to_string()));
        assert_eq!(formatted[7], (Prayer::Midnight, "23:13:01".to_string()));

        assert!(sample_set().format_all("%Q").is_err());
    }

    #[test]
    fn test_display_table() {
        let table = sample_set().to_string();
        assert!(table.starts_with("Prayer Times:\n"));
        assert!(table.contains("Fajr:     03:02"));
        assert!(table.contains("Midnight: 23:13"));
    }

    #[test]
    fn test_serialize_rfc3339() {
        let json = serde_json::to_value(sample_set()).unwrap();
        assert_eq!(json["dhuhr"], "2024-06-21T12:06:16+03:30");
    }
}
