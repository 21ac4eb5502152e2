// src/tools/weather.rs

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::model::{Coordinate, DailyWeather, WeatherResult};
use crate::tools::{WeatherError, WeatherProvider};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode";

/// Daily forecasts from Open-Meteo.
pub struct OpenMeteoTool {
    client: Client,
    base_url: String,
}

impl OpenMeteoTool {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl WeatherProvider for OpenMeteoTool {
    fn name(&self) -> &str {
        "open-meteo"
    }

    fn get_weather(&self, at: Coordinate, start: NaiveDate, end: NaiveDate) -> Result<WeatherResult, WeatherError> {
        let params = [
            ("latitude", at.lat.to_string()),
            ("longitude", at.lon.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "UTC".to_string()),
        ];
        debug!("open-meteo request: {},{} {}..{}", at.lat, at.lon, start, end);

        let resp = self.client.get(&self.base_url).query(&params).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Request { status: status.as_u16() });
        }
        let forecast: Forecast = resp
            .json()
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;
        daily_entries(at, forecast)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub daily: DailySeries,
}

/// Open-Meteo's column-oriented daily block. Columns may be shorter than
/// `time` or contain nulls.
#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i64>>,
}

/// Pivot the columns into one entry per date.
pub fn daily_entries(at: Coordinate, forecast: Forecast) -> Result<WeatherResult, WeatherError> {
    let series = forecast.daily;
    let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let daily = series
        .time
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|_| WeatherError::InvalidResponse(format!("bad date '{}'", day)))?;
            let code = series.weathercode.get(i).copied().flatten();
            let max_temp = column(&series.temperature_2m_max, i);
            let min_temp = column(&series.temperature_2m_min, i);
            Ok(DailyWeather {
                date,
                summary: summarize(code, max_temp, min_temp),
                max_temp,
                min_temp,
                weathercode: code,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(WeatherResult {
        lat: at.lat,
        lon: at.lon,
        daily,
    })
}

pub fn describe_code(code: Option<i64>) -> &'static str {
    match code {
        Some(0) => "Clear",
        Some(1) => "Mainly clear",
        Some(2) => "Partly cloudy",
        Some(3) => "Overcast",
        Some(61) => "Rain",
        Some(63) | Some(80) => "Rain showers",
        Some(71) => "Snow",
        _ => "Mixed",
    }
}

pub fn summarize(code: Option<i64>, max_temp: Option<f64>, min_temp: Option<f64>) -> String {
    let phrase = describe_code(code);
    match (max_temp, min_temp) {
        (Some(max), Some(min)) => format!("{phrase}, max {max:.1}°C, min {min:.1}°C"),
        (Some(max), None) => format!("{phrase}, max {max:.1}°C"),
        (None, _) => phrase.to_string(),
    }
}
