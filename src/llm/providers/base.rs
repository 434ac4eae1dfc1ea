use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;
use tracing::warn;

use crate::llm::json::{extract_json, json_prompt};


/// Everything an adapter can report back to the router.
///
/// Vendor-side failures of any kind (network, HTTP status, undecodable body,
/// empty completion, timeout) are `Transport`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("request timed out: {e}"))
        } else if let Some(status) = e.status() {
            Self::Transport(format!("HTTP {status}: {e}"))
        } else {
            Self::Transport(e.to_string())
        }
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrivacyLevel {
    /// Inference never leaves the host.
    Local,
    /// Vendor-hosted API.
    Cloud,
}


/// Static ranking metadata; never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Tie-break rank, lower is preferred.
    pub priority: u8,
    /// Informational only.
    pub cost_per_token: f64,
    /// 1 (slowest) to 10 (fastest).
    pub speed_rating: u8,
    pub privacy_level: PrivacyLevel,
    pub supports_vision: bool,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Ask the vendor for its native JSON output mode where one exists.
    #[serde(default)]
    pub json_mode: bool,
}

impl GenerateOptions {

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }


    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }


    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }


    pub fn json() -> Self {
        Self {
            json_mode: true,
            temperature: Some(0.2),
            ..Default::default()
        }
    }
}


/// Raw image handed to multimodal adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {

    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }


    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }


    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}


#[async_trait]
pub trait AiProvider: Send + Sync {

    fn name(&self) -> &str;


    fn model_name(&self) -> &str;


    fn capabilities(&self) -> ProviderCapabilities;

    /// Cheap, cached liveness check. Never errors: unconfigured or
    /// unreachable providers report `false`.
    async fn is_available(&self) -> bool;


    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError>;

    /// Generates text in JSON mode and extracts the outermost object from it.
    async fn generate_json(
        &self,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<Value, ProviderError> {
        let text = self
            .generate_text(&json_prompt(prompt, schema), &GenerateOptions::json())
            .await?;
        extract_json(&text)
    }


    async fn analyze_image(
        &self,
        _image: &ImageInput,
        _prompt: &str,
    ) -> Result<String, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not support image analysis",
            self.name()
        )))
    }
}


pub(crate) fn build_http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
        Client::new()
    })
}


/// Turns a non-success response into a `Transport` error carrying a body
/// preview.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Transport(format!(
        "HTTP {}: {}",
        status,
        crate::safe_truncate(&body, 200)
    )))
}
