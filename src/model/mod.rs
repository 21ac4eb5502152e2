// src/model/mod.rs

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parse::ParseError;

/// Free-form trip preferences ("pace": "slow", "interests": [...], ...).
pub type Preferences = Map<String, Value>;

/// Structured trip parameters extracted from the user's sentence.
///
/// Built once by the parser and never mutated afterwards; the orchestrator
/// only ever reads it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripRequest {
    city: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    preferences: Preferences,
}

impl TripRequest {
    pub fn new(
        city: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        preferences: Preferences,
    ) -> Result<Self, ParseError> {
        if start_date > end_date {
            return Err(ParseError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            city: city.into(),
            start_date,
            end_date,
            preferences,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn day_count(&self) -> usize {
        day_count(self.start_date, self.end_date)
    }
}

/// Number of calendar days in `start..=end`, or 0 for an inverted range.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> usize {
    let days = (end - start).num_days();
    if days < 0 { 0 } else { days as usize + 1 }
}

/// The `offset`-th day after `start`, if representable.
pub fn nth_day(start: NaiveDate, offset: usize) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(offset as u64))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub category: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub short_desc: String,
}

/// Points of interest around a city center, in provider order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoiResult {
    pub city: String,
    pub center: Coordinate,
    pub pois: Vec<Poi>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub summary: String,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub weathercode: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub lat: f64,
    pub lon: f64,
    pub daily: Vec<DailyWeather>,
}

/// One calendar day of the itinerary. Absent slots serialize as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub evening: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: Vec<DayPlan>,
}
