// src/tools/mod.rs

pub mod error;
pub mod itinerary;
pub mod llm;
pub mod poi;
pub mod weather;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Coordinate, PoiResult, WeatherResult};
use crate::protocol::{ITINERARY_CREATOR, POI_TOOL, WEATHER_TOOL};

pub use error::{LlmError, PoiError, ToolError, WeatherError};
pub use itinerary::ItinerarySynthesizer;
pub use llm::{DisabledModel, GeminiModel, OllamaModel, PlanningModel};
pub use poi::OsmPoiTool;
pub use weather::OpenMeteoTool;

/// Looks up points of interest around a named place.
pub trait PoiProvider: Send + Sync {
    fn name(&self) -> &str;
    fn find_pois(&self, city: &str, limit: usize) -> Result<PoiResult, PoiError>;
}

/// Looks up a daily forecast for a coordinate and inclusive date range.
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;
    fn get_weather(&self, at: Coordinate, start: NaiveDate, end: NaiveDate) -> Result<WeatherResult, WeatherError>;
}

/// Tool description handed to the planning model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

/// The three capabilities a plan may use.
pub fn catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: POI_TOOL.into(),
            description: "Returns a list of points of interest for a city. Call with: {city: <city>, limit: <int>}. \
                Returns JSON: {city, center:{lat,lon}, pois:[{name,category,lat,lon,short_desc}, ...]}."
                .into(),
        },
        ToolSpec {
            name: WEATHER_TOOL.into(),
            description: "Returns daily weather data for latitude/longitude & date range. \
                Call with: {lat, lon, start_date, end_date}. \
                Returns JSON: {lat,lon,daily:[{date,summary,max_temp,min_temp,weathercode}, ...]}."
                .into(),
        },
        ToolSpec {
            name: ITINERARY_CREATOR.into(),
            description: "Takes POIs, weather, preferences, and date range and returns a day-by-day itinerary JSON table. \
                Call with: {pois, weather_daily, start_date, end_date, preferences}."
                .into(),
        },
    ]
}
