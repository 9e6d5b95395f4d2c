use chrono::{Duration, NaiveDate};
use shared::error::{PrayerError, PrayerResult};
use shared::validation::resolve_timezone;
use tracing::debug;

use crate::assembler::TimeAssembler;
use crate::calculations::{julian_day, solar_parameters};
use crate::models::{CalculatorConfig, Location, PrayerTimeSet};

/// Upper bound for `calculate_days`, one leap year.
pub const MAX_DAYS: u16 = 366;

/// Computes prayer times from solar position. Holds only its configuration,
/// so one instance can serve any number of locations and threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrayerTimeCalculator {
    config: CalculatorConfig,
}

impl PrayerTimeCalculator {
    /// Uses `config` as given. Out-of-range or NaN settings are not checked
    /// here; use [`PrayerTimeCalculator::try_new`] for untrusted input.
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Validates `config` before accepting it.
    pub fn try_new(config: CalculatorConfig) -> PrayerResult<Self> {
        Ok(Self::new(config.validated()?))
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Computes the eight times of `date` for a location given in degrees
    /// (north and east positive) and an IANA zone name.
    ///
    /// Fails only when `timezone` cannot be resolved, or for dates at the very
    /// end of the representable calendar.
    pub fn calculate(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        timezone: &str,
    ) -> PrayerResult<PrayerTimeSet> {
        let tz = resolve_timezone(timezone)?;
        debug!(
            "Calculating prayer times for {} at {:.4}, {:.4} ({})",
            date, latitude, longitude, timezone
        );

        let next_date = date.succ_opt().ok_or_else(|| {
            PrayerError::date_out_of_range(format!("No calendar day after {}", date))
        })?;
        let today = solar_parameters(julian_day(date));
        let tomorrow = solar_parameters(julian_day(next_date));

        TimeAssembler::new(latitude, longitude, tz, self.config).assemble(date, &today, &tomorrow)
    }

    pub fn calculate_for_location(
        &self,
        date: NaiveDate,
        location: &Location,
    ) -> PrayerResult<PrayerTimeSet> {
        self.calculate(date, location.latitude, location.longitude, &location.timezone)
    }

    /// Consecutive days starting at `start`.
    pub fn calculate_days(
        &self,
        start: NaiveDate,
        days: u16,
        location: &Location,
    ) -> PrayerResult<Vec<PrayerTimeSet>> {
        if days > MAX_DAYS {
            return Err(PrayerError::validation(format!(
                "Day count cannot exceed {} days",
                MAX_DAYS
            )));
        }

        (0..days)
            .map(|offset| {
                let date = start
                    .checked_add_signed(Duration::days(i64::from(offset)))
                    .ok_or_else(|| {
                        PrayerError::date_out_of_range(format!(
                            "{} days after {} is out of range",
                            offset, start
                        ))
                    })?;
                self.calculate_for_location(date, location)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::School;
    use chrono::{TimeZone, Timelike, Utc};
    use chrono_tz::Tz;

    const TEHRAN_LAT: f64 = 35.6892;
    const TEHRAN_LNG: f64 = 51.3890;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seconds_apart(a: chrono::DateTime<Tz>, b: chrono::DateTime<Utc>) -> i64 {
        (a.with_timezone(&Utc) - b).num_seconds().abs()
    }

    #[test]
    fn test_tehran_summer_solstice() {
        let calculator = PrayerTimeCalculator::default();
        let times = calculator
            .calculate(date(2024, 6, 21), TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
            .unwrap();

        // Solar noon is 08:36:16 UTC; Iran keeps +03:30 all year.
        let noon_utc = Utc.with_ymd_and_hms(2024, 6, 21, 8, 36, 16).unwrap();
        assert!(seconds_apart(times.dhuhr, noon_utc) <= 3);
        assert_eq!((times.dhuhr.hour(), times.dhuhr.minute()), (12, 6));

        assert!(times.sunrise.hour() < 6);
        assert!(times.sunset.hour() >= 19);

        let isha_after_sunset = (times.isha - times.sunset).num_minutes();
        assert!((75..=90).contains(&isha_after_sunset), "got {}", isha_after_sunset);

        assert!(times.is_ordered());
        assert!(times.isha < times.midnight);
    }

    #[test]
    fn test_reference_times_local() {
        let day = date(2024, 6, 21);
        let times = PrayerTimeCalculator::default()
            .calculate(day, TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
            .unwrap();

        let expected = [
            (times.fajr, (3, 2, 15)),
            (times.sunrise, (4, 48, 59)),
            (times.asr, (15, 55, 23)),
            (times.sunset, (19, 23, 33)),
            (times.maghrib, (19, 44, 33)),
            (times.isha, (20, 44, 14)),
            (times.midnight, (23, 13, 1)),
        ];
        for (time, (h, m, s)) in expected {
            let reference = day.and_hms_opt(h, m, s).unwrap();
            let drift = (time.naive_local() - reference).num_seconds().abs();
            assert!(drift <= 3, "{} differs from {}", time, reference);
        }
    }

    #[test]
    fn test_sunrise_sunset_symmetry() {
        let calculator = PrayerTimeCalculator::default();
        let times = calculator
            .calculate(date(2024, 12, 21), TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
            .unwrap();

        let morning = (times.dhuhr - times.sunrise).num_seconds();
        let evening = (times.sunset - times.dhuhr).num_seconds();
        assert!((morning - evening).abs() <= 1);
    }

    #[test]
    fn test_maghrib_offset_is_exact() {
        let config = CalculatorConfig {
            maghrib_offset_minutes: 19,
            ..Default::default()
        };
        let times = PrayerTimeCalculator::new(config)
            .calculate(date(2024, 3, 20), TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
            .unwrap();
        assert_eq!(times.maghrib - times.sunset, Duration::minutes(19));
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let calculator = PrayerTimeCalculator::default();
        let first = calculator
            .calculate(date(2024, 11, 3), 21.4225, 39.8262, "Asia/Riyadh")
            .unwrap();
        let second = calculator
            .calculate(date(2024, 11, 3), 21.4225, 39.8262, "Asia/Riyadh")
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_try_new_rejects_bad_config() {
        let nan_angle = CalculatorConfig {
            fajr_angle: f64::NAN,
            ..Default::default()
        };
        let err = PrayerTimeCalculator::try_new(nan_angle).unwrap_err();
        assert!(matches!(err, PrayerError::Validation(_)));

        let huge_offset = CalculatorConfig {
            maghrib_offset_minutes: i64::MAX,
            ..Default::default()
        };
        assert!(PrayerTimeCalculator::try_new(huge_offset).is_err());

        let calculator = PrayerTimeCalculator::try_new(CalculatorConfig::default()).unwrap();
        assert_eq!(calculator, PrayerTimeCalculator::default());
    }

    #[test]
    fn test_invalid_time_zone() {
        let err = PrayerTimeCalculator::default()
            .calculate(date(2024, 6, 21), TEHRAN_LAT, TEHRAN_LNG, "Asia/Atlantis")
            .unwrap_err();
        assert!(matches!(err, PrayerError::InvalidTimeZone(_)));
    }

    #[test]
    fn test_hanafi_asr_is_later() {
        let day = date(2024, 6, 21);
        let shafii = PrayerTimeCalculator::default()
            .calculate(day, TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
            .unwrap();
        let hanafi =
            PrayerTimeCalculator::new(CalculatorConfig::default().with_school(School::Hanafi))
                .calculate(day, TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran")
                .unwrap();

        assert!(hanafi.asr > shafii.asr);
        assert_eq!(hanafi.dhuhr, shafii.dhuhr);
        assert_eq!(hanafi.sunset, shafii.sunset);
    }

    #[test]
    fn test_polar_summer_does_not_fail() {
        // Tromsø: the sun stays above the horizon all day.
        let times = PrayerTimeCalculator::default()
            .calculate(date(2024, 6, 21), 69.6496, 18.9560, "Europe/Oslo")
            .unwrap();

        // Clamped hour angle of π puts sunrise and sunset 12 hours from noon.
        let morning = (times.dhuhr - times.sunrise).num_seconds();
        let evening = (times.sunset - times.dhuhr).num_seconds();
        assert!((morning - 43_200).abs() <= 1, "got {}", morning);
        assert!((evening - 43_200).abs() <= 1, "got {}", evening);
    }

    #[test]
    fn test_midnight_dst_gap_day() {
        let times = PrayerTimeCalculator::default()
            .calculate(date(2024, 9, 8), -33.45, -70.67, "America/Santiago")
            .unwrap();

        assert!(times.is_ordered());
        assert_eq!(times.fajr.date_naive(), date(2024, 9, 8));
        // Solar noon near 16:40 UTC is 13:40 local under the -03:00 offset.
        assert_eq!(times.dhuhr.hour(), 13);
    }

    #[test]
    fn test_calculate_days() {
        let location = Location::new(TEHRAN_LAT, TEHRAN_LNG, "Asia/Tehran").unwrap();
        let calculator = PrayerTimeCalculator::default();

        let week = calculator.calculate_days(date(2024, 3, 18), 7, &location).unwrap();
        assert_eq!(week.len(), 7);
        for pair in week.windows(2) {
            assert_eq!(pair[1].dhuhr.date_naive(), pair[0].dhuhr.date_naive().succ_opt().unwrap());
        }
        assert_eq!(
            week[0],
            calculator.calculate_for_location(date(2024, 3, 18), &location).unwrap()
        );

        assert!(calculator.calculate_days(date(2024, 1, 1), 367, &location).is_err());
        assert!(calculator.calculate_days(date(2024, 1, 1), 0, &location).unwrap().is_empty());
    }

    #[test]
    fn test_last_representable_day() {
        let err = PrayerTimeCalculator::default()
            .calculate(NaiveDate::MAX, 0.0, 0.0, "UTC")
            .unwrap_err();
        assert!(matches!(err, PrayerError::DateOutOfRange(_)));
    }
}
