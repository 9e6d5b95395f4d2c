use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::Reader;
use serde::{Deserialize, Serialize};
use shared::error::{PrayerError, PrayerResult};
use tracing::{info, warn};

use crate::calculator::PrayerTimeCalculator;
use crate::models::{Location, PrayerTimeSet};
use crate::services::LocalClock;

/// Built-in table: (name, Persian name, latitude, longitude).
const IRAN_CITIES: [(&str, &str, f64, f64); 10] = [
    ("tehran", "تهران", 35.6892, 51.3890),
    ("tabriz", "تبریز", 38.0800, 46.2919),
    ("mashhad", "مشهد", 36.3264, 59.5433),
    ("isfahan", "اصفهان", 32.6525, 51.6746),
    ("shiraz", "شیراز", 29.5918, 52.5837),
    ("qom", "قم", 34.6401, 50.8764),
    ("ahvaz", "اهواز", 31.3203, 48.6692),
    ("kermanshah", "کرمانشاه", 34.3142, 47.0650),
    ("rasht", "رشت", 37.2808, 49.5831),
    ("yazd", "یزد", 31.8974, 54.3569),
];

const IRAN_TIMEZONE: &str = "Asia/Tehran";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct City {
    pub name: String,
    pub persian_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl City {
    /// Name with the first letter capitalised, e.g. `Kermanshah`.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn location(&self) -> PrayerResult<Location> {
        Location::new(self.latitude, self.longitude, self.timezone.clone())
    }
}

/// Case-insensitive lookup of cities by name.
pub struct CityDirectory {
    map: HashMap<String, City>,
}

impl CityDirectory {
    pub fn builtin() -> Self {
        let map = IRAN_CITIES
            .iter()
            .map(|&(name, persian_name, latitude, longitude)| {
                let city = City {
                    name: name.to_string(),
                    persian_name: persian_name.to_string(),
                    latitude,
                    longitude,
                    timezone: IRAN_TIMEZONE.to_string(),
                };
                (name.to_string(), city)
            })
            .collect();
        Self { map }
    }

    /// Reads `name,persian_name,latitude,longitude,timezone` records.
    /// Records that fail to parse or validate are skipped with a warning.
    pub fn from_csv<R: Read>(source: R) -> PrayerResult<Self> {
        let mut reader = Reader::from_reader(source);
        let mut map = HashMap::new();

        for result in reader.deserialize::<City>() {
            match result {
                Ok(city) => match city.location() {
                    Ok(_) => {
                        map.insert(city.name.to_lowercase(), city);
                    }
                    Err(e) => warn!("Skipping city '{}': {}", city.name, e),
                },
                Err(e) => warn!("Failed to parse city record: {}", e),
            }
        }

        if map.is_empty() {
            return Err(PrayerError::validation("City file contains no valid records"));
        }

        info!("Loaded {} cities", map.len());
        Ok(Self { map })
    }

    pub fn get(&self, name: &str) -> PrayerResult<&City> {
        self.map
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| PrayerError::not_found(format!("City '{}'", name)))
    }

    pub fn list_supported_cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.map.keys().cloned().collect();
        cities.sort();
        cities
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Times for a city; `date` defaults to today in the city's own zone.
pub fn calculate_for_city(
    city: &City,
    date: Option<NaiveDate>,
    calculator: &PrayerTimeCalculator,
) -> PrayerResult<PrayerTimeSet> {
    let location = city.location()?;
    let date = match date {
        Some(date) => date,
        None => LocalClock::today(location.time_zone()?),
    };
    calculator.calculate_for_location(date, &location)
}

pub fn calculate_for_coordinates(
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
    timezone: &str,
    calculator: &PrayerTimeCalculator,
) -> PrayerResult<PrayerTimeSet> {
    calculator.calculate(date, latitude, longitude, timezone)
}
