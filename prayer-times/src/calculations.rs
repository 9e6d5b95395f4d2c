//! Low-precision solar astronomy: Julian days, solar declination and the
//! equation of time, and hour angles for a target sun altitude.
//!
//! Accuracy is around one minute of time for civil dates, which is what
//! prayer timetables need.

use chrono::{Datelike, NaiveDate};
use libm::{acos, asin, atan, atan2, cos, fabs, floor, sin, tan};

use crate::models::SolarParameters;

const PI: f64 = std::f64::consts::PI;

/// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000: f64 = 2451545.0;

// Math utility functions
pub(crate) fn dtr(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub(crate) fn rtd(radians: f64) -> f64 {
    radians * 180.0 / PI
}

fn fix_angle(angle: f64) -> f64 {
    fix(angle, 360.0)
}

/// Non-negative remainder of `a / b`.
fn fix(a: f64, b: f64) -> f64 {
    let a = a - b * floor(a / b);
    if a < 0.0 {
        a + b
    } else {
        a
    }
}

/// Wraps an angle difference into [-180, 180].
fn wrap_half_turn(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Julian day at 0h UT of a proleptic Gregorian date.
pub fn julian_day(date: NaiveDate) -> f64 {
    let mut year = date.year() as f64;
    let mut month = date.month() as f64;
    let day = date.day() as f64;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = floor(year / 100.0);
    let b = 2.0 - a + floor(a / 4.0);

    floor(365.25 * (year + 4716.0)) + floor(30.6001 * (month + 1.0)) + day + b - 1524.5
}

/// Solar declination and equation of time for a Julian day.
pub fn solar_parameters(julian_day: f64) -> SolarParameters {
    let d = julian_day - J2000;

    let mean_anomaly = dtr(357.529 + 0.98560028 * d);
    let mean_longitude = 280.459 + 0.98564736 * d;
    let ecliptic_longitude = dtr(fix_angle(
        mean_longitude + 1.915 * sin(mean_anomaly) + 0.020 * sin(2.0 * mean_anomaly),
    ));
    let obliquity = dtr(23.439 - 0.00000036 * d);

    let right_ascension = fix_angle(rtd(atan2(
        cos(obliquity) * sin(ecliptic_longitude),
        cos(ecliptic_longitude),
    )));
    let declination = asin(sin(obliquity) * sin(ecliptic_longitude));

    let delta = wrap_half_turn(fix_angle(mean_longitude) - right_ascension);

    SolarParameters {
        declination,
        equation_of_time: 4.0 * delta,
    }
}

/// Hour angle (radians) at which the sun stands at `altitude` degrees.
///
/// The cosine is clamped to [-1, 1]: when the sun never reaches the altitude
/// on that day the result is the nearest boundary, `0` (never rises to it)
/// or `π` (never sinks to it), instead of NaN.
pub fn hour_angle(altitude: f64, latitude: f64, declination: f64) -> f64 {
    let cos_hour_angle = (sin(dtr(altitude)) - sin(latitude) * sin(declination))
        / (cos(latitude) * cos(declination));
    acos(cos_hour_angle.clamp(-1.0, 1.0))
}

/// Sun altitude (degrees) at which a shadow is `shadow_factor` times the
/// object's height plus its noon shadow.
pub fn asr_altitude(shadow_factor: f64, latitude: f64, declination: f64) -> f64 {
    rtd(atan(1.0 / (shadow_factor + tan(fabs(latitude - declination)))))
}

/// Hour angle (radians) of Asr for the given shadow factor.
pub fn asr_hour_angle(shadow_factor: f64, latitude: f64, declination: f64) -> f64 {
    hour_angle(
        asr_altitude(shadow_factor, latitude, declination),
        latitude,
        declination,
    )
}
