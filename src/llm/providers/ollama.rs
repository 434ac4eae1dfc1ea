use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::base::{
    AiProvider, GenerateOptions, PrivacyLevel, ProviderCapabilities, ProviderError,
    build_http_client, check_status,
};
use crate::core::{HealthCache, HttpSettings};
use crate::utils::normalize_base_url;
use crate::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaTag {
    name: String,
}


/// Local inference daemon. The only `local` provider, so it alone serves
/// privacy-sensitive prompts.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    temperature: f64,
    probe_timeout: Duration,
    client: Client,
    health: HealthCache,
}

impl OllamaProvider {

    pub fn new(base_url: &str, model: impl Into<String>, settings: &HttpSettings) -> Self {
        let base_url = normalize_base_url(base_url);
        let model = model.into();
        info!("Ollama provider initialized (model={}, url={})", model, base_url);
        Self {
            base_url,
            model,
            temperature: settings.temperature,
            probe_timeout: settings.probe_timeout,
            client: build_http_client(settings.request_timeout),
            health: HealthCache::new(settings.health_ttl),
        }
    }


    pub fn localhost() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL, &HttpSettings::default())
    }


    pub fn health_probes(&self) -> u64 {
        self.health.probe_count()
    }

    /// `llama3.2` matches an installed `llama3.2:latest`.
    fn is_configured_model(&self, installed: &str) -> bool {
        installed == self.model
            || (!self.model.contains(':')
                && installed.split(':').next() == Some(self.model.as_str()))
    }

    async fn probe(&self) -> bool {
        let result = async {
            let response = self
                .client
                .get(format!("{}/api/tags", self.base_url))
                .timeout(self.probe_timeout)
                .send()
                .await?;
            let tags = check_status(response).await?.json::<OllamaTags>().await?;
            Ok::<_, ProviderError>(tags.models)
        }
        .await;

        match result {
            Ok(models) => {
                let found = models.iter().any(|m| self.is_configured_model(&m.name));
                if !found {
                    debug!(
                        "ollama reachable but model {} not installed ({} models)",
                        self.model,
                        models.len()
                    );
                }
                found
            }
            Err(e) => {
                debug!("ollama probe failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            priority: 4,
            cost_per_token: 0.0,
            speed_rating: 4,
            privacy_level: PrivacyLevel::Local,
            supports_vision: false,
        }
    }

    async fn is_available(&self) -> bool {
        self.health.get_or_probe(|| self.probe()).await
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature.unwrap_or(self.temperature),
                num_predict: options.max_tokens,
            },
            format: options.json_mode.then_some("json"),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let response = check_status(response)
            .await?
            .json::<OllamaResponse>()
            .await?;

        debug!(
            "ollama tokens: prompt={}, completion={}",
            response.prompt_eval_count, response.eval_count
        );

        if response.message.content.trim().is_empty() {
            return Err(ProviderError::Transport(
                "ollama returned an empty message".to_string(),
            ));
        }
        Ok(response.message.content)
    }
}
