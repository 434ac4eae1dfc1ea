use async_trait::async_trait;
use tracing::info;

use super::base::{
    AiProvider, GenerateOptions, ImageInput, PrivacyLevel, ProviderCapabilities, ProviderError,
};
use super::openai_compat::ChatCompletionsClient;
use crate::core::{HealthCache, HttpSettings};
use crate::{DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};


pub struct OpenAiProvider {
    chat: ChatCompletionsClient,
    health: HealthCache,
}

impl OpenAiProvider {

    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: &str,
        settings: &HttpSettings,
    ) -> Self {
        let chat = ChatCompletionsClient::new("openai", api_key, model, base_url, settings);
        info!(
            "OpenAI provider initialized (model={}, configured={})",
            chat.model(),
            chat.is_configured()
        );
        Self {
            chat,
            health: HealthCache::new(settings.health_ttl),
        }
    }


    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(
            Some(api_key.into()),
            DEFAULT_OPENAI_MODEL,
            DEFAULT_OPENAI_URL,
            &HttpSettings::default(),
        )
    }


    pub fn base_url(&self) -> &str {
        self.chat.base_url()
    }


    pub fn health_probes(&self) -> u64 {
        self.health.probe_count()
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        self.chat.model()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            priority: 2,
            cost_per_token: 0.000_000_6,
            speed_rating: 7,
            privacy_level: PrivacyLevel::Cloud,
            supports_vision: true,
        }
    }

    async fn is_available(&self) -> bool {
        if !self.chat.is_configured() {
            return false;
        }
        self.health.get_or_probe(|| self.chat.probe()).await
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.chat.complete_text(prompt, options).await
    }

    async fn analyze_image(&self, image: &ImageInput, prompt: &str) -> Result<String, ProviderError> {
        self.chat.complete_image(image, prompt).await
    }
}
