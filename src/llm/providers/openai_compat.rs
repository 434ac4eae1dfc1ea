//! Chat-completions client shared by the OpenAI and Groq adapters, which
//! speak the same wire protocol.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::base::{
    GenerateOptions, ImageInput, ProviderError, build_http_client, check_status,
};
use crate::core::HttpSettings;
use crate::utils::normalize_base_url;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}


pub(crate) struct ChatCompletionsClient {
    provider: &'static str,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f64,
    probe_timeout: Duration,
    client: Client,
}

impl ChatCompletionsClient {
    pub(crate) fn new(
        provider: &'static str,
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: &str,
        settings: &HttpSettings,
    ) -> Self {
        Self {
            provider,
            api_key,
            model: model.into(),
            base_url: normalize_base_url(base_url),
            temperature: settings.temperature,
            probe_timeout: settings.probe_timeout,
            client: build_http_client(settings.request_timeout),
        }
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(format!("{} API key missing", self.provider)))
    }

    /// Lists models; a reachable endpoint with an empty list counts as
    /// unusable.
    pub(crate) async fn probe(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };

        let result = async {
            let response = self
                .client
                .get(format!("{}/models", self.base_url))
                .bearer_auth(api_key)
                .timeout(self.probe_timeout)
                .send()
                .await?;
            let models = check_status(response).await?.json::<ModelList>().await?;
            Ok::<_, ProviderError>(models.data)
        }
        .await;

        match result {
            Ok(models) if !models.is_empty() => {
                debug!(
                    "{} probe ok: {} models (first={})",
                    self.provider,
                    models.len(),
                    models[0].id
                );
                true
            }
            Ok(_) => {
                debug!("{} probe reached API but no models are usable", self.provider);
                false
            }
            Err(e) => {
                debug!("{} probe failed: {}", self.provider, e);
                false
            }
        }
    }

    pub(crate) async fn complete_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.complete(MessageContent::Text(prompt.to_string()), options)
            .await
    }

    pub(crate) async fn complete_image(
        &self,
        image: &ImageInput,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let parts = vec![
            ContentPart::Text {
                text: prompt.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_url(),
                },
            },
        ];
        self.complete(MessageContent::Parts(parts), &GenerateOptions::default())
            .await
    }

    async fn complete(
        &self,
        user_content: MessageContent,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: MessageContent::Text(system.clone()),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_content,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature.unwrap_or(self.temperature),
            max_tokens: options.max_tokens,
            response_format: options.json_mode.then_some(ResponseFormat {
                r#type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response)
            .await?
            .json::<ChatResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Transport(format!("{} returned no completion", self.provider))
            })
    }
}
