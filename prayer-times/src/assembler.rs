//! Turns solar parameters into zoned prayer timestamps.
//!
//! All intermediate times are minutes after 00:00 UTC of the target date.
//! They may fall outside [0, 1440) when the event belongs to the neighbouring
//! UTC day.

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use libm::floor;
use shared::error::{PrayerError, PrayerResult};
use tracing::debug;

use crate::calculations::{asr_hour_angle, dtr, hour_angle, rtd};
use crate::models::{CalculatorConfig, PrayerTimeSet, SolarParameters};
use crate::services::LocalClock;

/// Minutes of time per degree of hour angle.
const MINUTES_PER_DEGREE: f64 = 4.0;

/// Rounds a UTC-minute value, shifted by the zone offset, to whole local
/// seconds after local midnight. Ties round up, never to even.
pub fn local_seconds(utc_minutes: f64, offset_minutes: i64) -> i64 {
    let total_minutes = utc_minutes + offset_minutes as f64;
    floor(total_minutes * 60.0 + 0.5) as i64
}

pub struct TimeAssembler {
    tz: Tz,
    /// Radians.
    latitude: f64,
    /// Degrees, east positive.
    longitude: f64,
    config: CalculatorConfig,
}

impl TimeAssembler {
    pub fn new(latitude: f64, longitude: f64, tz: Tz, config: CalculatorConfig) -> Self {
        Self {
            tz,
            latitude: dtr(latitude),
            longitude,
            config,
        }
    }

    /// Solar transit in UTC minutes.
    pub fn solar_noon(&self, solar: &SolarParameters) -> f64 {
        720.0 - MINUTES_PER_DEGREE * self.longitude - solar.equation_of_time
    }

    /// Time the sun crosses `altitude`; `direction` is -1 before noon, +1 after.
    fn altitude_time(&self, solar: &SolarParameters, altitude: f64, direction: f64) -> f64 {
        let h = hour_angle(altitude, self.latitude, solar.declination);
        self.solar_noon(solar) + direction * MINUTES_PER_DEGREE * rtd(h)
    }

    pub fn sunrise_minutes(&self, solar: &SolarParameters) -> f64 {
        self.altitude_time(solar, self.config.sunrise_sunset_altitude, -1.0)
    }

    pub fn sunset_minutes(&self, solar: &SolarParameters) -> f64 {
        self.altitude_time(solar, self.config.sunrise_sunset_altitude, 1.0)
    }

    pub fn fajr_minutes(&self, solar: &SolarParameters) -> f64 {
        self.altitude_time(solar, -self.config.fajr_angle, -1.0)
    }

    pub fn isha_minutes(&self, solar: &SolarParameters) -> f64 {
        self.altitude_time(solar, -self.config.isha_angle, 1.0)
    }

    pub fn asr_minutes(&self, solar: &SolarParameters) -> f64 {
        let h = asr_hour_angle(
            self.config.asr_shadow_factor,
            self.latitude,
            solar.declination,
        );
        self.solar_noon(solar) + MINUTES_PER_DEGREE * rtd(h)
    }

    /// Zoned timestamp for `utc_minutes` after 00:00 UTC of `date`.
    pub fn to_local(&self, date: NaiveDate, utc_minutes: f64) -> PrayerResult<DateTime<Tz>> {
        let midnight = LocalClock::local_midnight(date, self.tz)?;
        let seconds = local_seconds(utc_minutes, midnight.offset_minutes);
        midnight
            .instant
            .checked_add_signed(Duration::seconds(seconds))
            .ok_or_else(|| {
                PrayerError::date_out_of_range(format!(
                    "{} seconds after midnight of {} is not representable",
                    seconds, date
                ))
            })
    }

    /// Builds the full set for `date`. `next_day` holds the solar parameters
    /// of the following calendar day and only feeds the Midnight estimate.
    pub fn assemble(
        &self,
        date: NaiveDate,
        solar: &SolarParameters,
        next_day: &SolarParameters,
    ) -> PrayerResult<PrayerTimeSet> {
        let noon = self.solar_noon(solar);
        debug!(
            "Solar noon for {} at {:.3} UTC minutes (declination {:.4} rad, equation of time {:.3} min)",
            date, noon, solar.declination, solar.equation_of_time
        );

        let fajr = self.to_local(date, self.fajr_minutes(solar))?;
        let sunrise = self.to_local(date, self.sunrise_minutes(solar))?;
        let dhuhr = self.to_local(date, noon)?;
        let asr = self.to_local(date, self.asr_minutes(solar))?;
        let sunset = self.to_local(date, self.sunset_minutes(solar))?;
        let isha = self.to_local(date, self.isha_minutes(solar))?;

        let maghrib = sunset + Duration::minutes(self.config.maghrib_offset_minutes);

        let next_date = date.succ_opt().ok_or_else(|| {
            PrayerError::date_out_of_range(format!("No calendar day after {}", date))
        })?;
        let next_fajr = self.to_local(next_date, self.fajr_minutes(next_day))?;
        let half_night = (next_fajr - sunset).num_seconds().div_euclid(2);
        let midnight = sunset + Duration::seconds(half_night);

        Ok(PrayerTimeSet {
            fajr,
            sunrise,
            dhuhr,
            asr,
            sunset,
            maghrib,
            isha,
            midnight,
        })
    }
}
