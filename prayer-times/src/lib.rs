//! Islamic prayer times from solar position.
//!
//! The pipeline runs date → Julian day → solar declination and equation of
//! time → hour angles → zoned timestamps. Everything is a pure function of
//! the date, the location and a [`CalculatorConfig`].
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use prayer_times::PrayerTimeCalculator;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
//! let times = PrayerTimeCalculator::default()
//!     .calculate(date, 35.6892, 51.3890, "Asia/Tehran")
//!     .unwrap();
//! println!("{}", times);
//! ```

pub mod assembler;
pub mod calculations;
pub mod calculator;
pub mod cities;
pub mod models;
pub mod services;

pub use calculator::PrayerTimeCalculator;
pub use cities::{calculate_for_city, calculate_for_coordinates, City, CityDirectory};
pub use models::{
    CalculationMethod, CalculatorConfig, Location, Prayer, PrayerTimeSet, School, SolarParameters,
};
pub use shared::error::{PrayerError, PrayerResult};
