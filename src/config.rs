// src/config.rs

//! Trip agent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::DEFAULT_POI_LIMIT;

const USER_AGENT: &str = "travel-agent/1.0";
const OLLAMA_URL: &str = "http://localhost:11434";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Planning model configuration
    pub llm: LlmConfig,

    /// Points-of-interest provider
    pub poi: PoiConfig,

    /// Weather provider
    pub weather: WeatherConfig,

    /// HTTP server
    pub server: ServerConfig,
}

impl Config {
    /// Check that the configured planning model can actually be reached.
    ///
    /// An unusable model is not fatal (every model call has a deterministic
    /// fallback), so callers usually just log the error.
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider == LlmProvider::Gemini && std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.poi.default_limit == 0 {
            return Err(eyre::eyre!("poi.default-limit must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .trip-agent.yml
        let local_config = PathBuf::from(".trip-agent.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/trip-agent/trip-agent.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("trip-agent").join("trip-agent.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    Gemini,
    /// No model: plans and itineraries always use the deterministic fallbacks
    None,
}

/// Planning model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,

    /// Model identifier
    pub model: String,

    /// API base URL; empty means the provider's default
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the API key (gemini only)
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            model: "llama3".to_string(),
            base_url: String::new(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    pub fn endpoint(&self) -> &str {
        if !self.base_url.is_empty() {
            return &self.base_url;
        }
        match self.provider {
            LlmProvider::Gemini => GEMINI_URL,
            LlmProvider::Ollama | LlmProvider::None => OLLAMA_URL,
        }
    }
}

/// Points-of-interest provider (Nominatim + Overpass)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    #[serde(rename = "geocode-url")]
    pub geocode_url: String,

    #[serde(rename = "overpass-url")]
    pub overpass_url: String,

    /// Search radius around the city center in meters
    #[serde(rename = "radius-m")]
    pub radius_m: u32,

    /// POIs requested when a plan step does not say
    #[serde(rename = "default-limit")]
    pub default_limit: usize,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            geocode_url: "https://nominatim.openstreetmap.org/search".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            radius_m: 10_000,
            default_limit: DEFAULT_POI_LIMIT,
            user_agent: USER_AGENT.to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Weather provider (Open-Meteo)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".to_string(),
        }
    }
}
