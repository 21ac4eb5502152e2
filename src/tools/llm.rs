// src/tools/llm.rs

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::tools::LlmError;

/// A text-in/text-out language model used for planning and itinerary drafting.
///
/// Replies are untrusted: callers extract and validate whatever JSON they
/// expect and fall back when it is missing or malformed.
pub trait PlanningModel: Send + Sync {
    fn name(&self) -> &str;
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Local model served by Ollama.
pub struct OllamaModel {
    model: String,
    base_url: String,
    client: Client,
}

impl OllamaModel {
    pub fn new(model: &str, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl PlanningModel for OllamaModel {
    fn name(&self) -> &str {
        "ollama"
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        debug!("ollama request: model={} prompt_len={}", self.model, prompt.len());
        let resp = self.client.post(&url).json(&payload).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: resp.text().unwrap_or_default(),
            });
        }

        let body: Value = resp.json()?;
        body.get("response")
            .and_then(Value::as_str)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("LLM response missing 'response' field".into()))
    }
}

/// Google Gemini via the `generateContent` REST endpoint.
pub struct GeminiModel {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl GeminiModel {
    pub fn new(model: &str, base_url: &str, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

impl PlanningModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let payload = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        debug!("gemini request: model={} prompt_len={}", self.model, prompt.len());
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: resp.text().unwrap_or_default(),
            });
        }

        let body: Value = resp.json()?;
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("Gemini response has no candidate text".into()))
    }
}

/// Stand-in when no model is configured; every call fails so callers take
/// their deterministic path.
pub struct DisabledModel;

impl PlanningModel for DisabledModel {
    fn name(&self) -> &str {
        "none"
    }

    fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

/// Extract the outermost `{...}` block from a model reply, skipping any
/// `<think>` preamble and markdown fences.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    let body = raw.rsplit("</think>").next().unwrap_or(raw);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}
