// src/tools/error.rs

//! Tool error types

use thiserror::Error;

/// POI provider failures.
#[derive(Debug, Error)]
pub enum PoiError {
    #[error("City geocoding failed for '{city}'")]
    Geocoding { city: String },

    #[error("Overpass API failed with status {status}")]
    Query { status: u16 },

    #[error("No POIs found for '{city}'")]
    NoPois { city: String },

    #[error("Invalid POI provider response: {0}")]
    InvalidResponse(String),

    #[error("POI request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Weather provider failures.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Open-Meteo API request failed with status {status}")]
    Request { status: u16 },

    #[error("Invalid weather response: {0}")]
    InvalidResponse(String),

    #[error("Weather request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not resolve coordinates: {0}")]
    Coordinates(#[source] PoiError),
}

/// A typed failure of one plan step. Recorded, never fatal.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Poi(#[from] PoiError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

/// Planning model failures. Always recovered by a deterministic fallback.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API key not found in ${0}")]
    MissingApiKey(String),

    #[error("Planning model disabled")]
    Disabled,
}
