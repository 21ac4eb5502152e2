// src/context/mod.rs

use std::sync::Arc;
use std::time::Duration;

use eyre::{Context as _, Result};
use tracing::{info, warn};

use crate::config::{Config, LlmProvider};
use crate::tools::{
    DisabledModel, GeminiModel, OllamaModel, OpenMeteoTool, OsmPoiTool, PlanningModel, PoiProvider, WeatherProvider,
};

pub const DEFAULT_POI_LIMIT: usize = 8;

/// Request-independent toolbox: the data providers and the planning model.
///
/// Holds no per-request state, so one `Context` is shared by every request.
pub struct Context {
    pub pois: Box<dyn PoiProvider>,
    pub weather: Box<dyn WeatherProvider>,
    pub llm: Arc<dyn PlanningModel>,
    pub poi_limit: usize,
}

impl Context {
    pub fn new<P, W>(pois: P, weather: W) -> Self
    where
        P: PoiProvider + 'static,
        W: WeatherProvider + 'static,
    {
        Self {
            pois: Box::new(pois),
            weather: Box::new(weather),
            llm: Arc::new(DisabledModel),
            poi_limit: DEFAULT_POI_LIMIT,
        }
    }

    pub fn with_llm<M: PlanningModel + 'static>(mut self, llm: M) -> Self {
        self.llm = Arc::new(llm);
        self
    }

    pub fn with_poi_limit(mut self, limit: usize) -> Self {
        self.poi_limit = limit.max(1);
        self
    }

    /// Build the production toolbox from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pois = OsmPoiTool::new(&config.poi).context("Failed to build POI client")?;
        let weather = OpenMeteoTool::new(&config.weather).context("Failed to build weather client")?;
        let context = Self::new(pois, weather).with_poi_limit(config.poi.default_limit);

        let timeout = Duration::from_millis(config.llm.timeout_ms);
        let context = match config.llm.provider {
            LlmProvider::Ollama => context.with_llm(
                OllamaModel::new(&config.llm.model, config.llm.endpoint(), timeout)
                    .context("Failed to build Ollama client")?,
            ),
            LlmProvider::Gemini => match std::env::var(&config.llm.api_key_env) {
                Ok(key) => context.with_llm(
                    GeminiModel::new(&config.llm.model, config.llm.endpoint(), key, timeout)
                        .context("Failed to build Gemini client")?,
                ),
                Err(_) => {
                    warn!(
                        "${} not set, planning model disabled (deterministic fallbacks only)",
                        config.llm.api_key_env
                    );
                    context
                }
            },
            LlmProvider::None => context,
        };

        info!(
            "toolbox ready: pois={} weather={} llm={}",
            context.pois.name(),
            context.weather.name(),
            context.llm.name()
        );
        Ok(context)
    }
}
