use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_GROQ_MODEL, DEFAULT_GROQ_URL,
    DEFAULT_HEALTH_TTL_SECS, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_MODEL,
    DEFAULT_OPENAI_URL, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};


/// Vendor credentials and endpoints for every provider adapter.
///
/// A missing API key is not an error: the adapter is still built and
/// reports itself unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,


    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,


    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,


    pub ollama_url: String,
    pub ollama_model: String,


    pub temperature: f64,
    pub request_timeout: u64,
    pub probe_timeout: u64,
    pub health_ttl: u64,
}

impl AiConfig {

    pub fn new() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_URL.to_string(),

            groq_api_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            groq_base_url: DEFAULT_GROQ_URL.to_string(),

            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_URL.to_string(),

            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),

            temperature: 0.7,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT_SECS,
            health_ttl: DEFAULT_HEALTH_TTL_SECS,
        }
    }


    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.openai_api_key = non_empty("OPENAI_API_KEY");
        if let Some(model) = non_empty("OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }

        config.groq_api_key = non_empty("GROQ_API_KEY");
        if let Some(model) = non_empty("GROQ_MODEL") {
            config.groq_model = model;
        }
        if let Some(url) = non_empty("GROQ_BASE_URL") {
            config.groq_base_url = url;
        }

        config.gemini_api_key = non_empty("GEMINI_API_KEY");
        if let Some(model) = non_empty("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            config.gemini_base_url = url;
        }

        if let Some(url) = non_empty("OLLAMA_URL") {
            config.ollama_url = url;
        }
        if let Some(model) = non_empty("OLLAMA_MODEL") {
            config.ollama_model = model;
        }

        if let Some(t) = non_empty("AI_TEMPERATURE").and_then(|v| v.parse().ok()) {
            config.temperature = t;
        }
        if let Some(secs) = non_empty("AI_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.request_timeout = secs;
        }
        if let Some(secs) = non_empty("AI_PROBE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.probe_timeout = secs;
        }
        if let Some(secs) = non_empty("AI_HEALTH_TTL_SECS").and_then(|v| v.parse().ok()) {
            config.health_ttl = secs;
        }

        config
    }


    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            request_timeout: Duration::from_secs(self.request_timeout),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            health_ttl: Duration::from_secs(self.health_ttl),
            temperature: self.temperature,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}


/// Timeouts and sampling defaults shared by the HTTP adapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub health_ttl: Duration,
    pub temperature: f64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        AiConfig::new().http_settings()
    }
}
