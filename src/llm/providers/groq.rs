use async_trait::async_trait;
use tracing::info;

use super::base::{AiProvider, GenerateOptions, PrivacyLevel, ProviderCapabilities, ProviderError};
use super::openai_compat::ChatCompletionsClient;
use crate::core::{HealthCache, HttpSettings};


/// Groq's OpenAI-compatible endpoint. Fastest backend, the default realtime
/// pick.
pub struct GroqProvider {
    chat: ChatCompletionsClient,
    health: HealthCache,
}

impl GroqProvider {

    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: &str,
        settings: &HttpSettings,
    ) -> Self {
        let chat = ChatCompletionsClient::new("groq", api_key, model, base_url, settings);
        info!(
            "Groq provider initialized (model={}, configured={})",
            chat.model(),
            chat.is_configured()
        );
        Self {
            chat,
            health: HealthCache::new(settings.health_ttl),
        }
    }


    pub fn health_probes(&self) -> u64 {
        self.health.probe_count()
    }
}

#[async_trait]
impl AiProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn model_name(&self) -> &str {
        self.chat.model()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            priority: 1,
            cost_per_token: 0.000_000_59,
            speed_rating: 10,
            privacy_level: PrivacyLevel::Cloud,
            supports_vision: false,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::ImageInput;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_with_ttl(ttl: Duration) -> HttpSettings {
        HttpSettings {
            health_ttl: ttl,
            ..HttpSettings::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_probe_cached_within_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GroqProvider::new(
            Some("gsk_test".to_string()),
            "llama-3.3-70b-versatile",
            &server.uri(),
            &HttpSettings::default(),
        );
        assert!(!provider.is_available().await);
        assert!(!provider.is_available().await);
        assert_eq!(provider.health_probes(), 1);
    }

    #[tokio::test]
    async fn test_probe_repeats_after_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("authorization", "Bearer gsk_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"id": "llama-3.3-70b-versatile"}]})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let provider = GroqProvider::new(
            Some("gsk_test".to_string()),
            "llama-3.3-70b-versatile",
            &server.uri(),
            &settings_with_ttl(Duration::from_millis(50)),
        );
        assert!(provider.is_available().await);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(provider.is_available().await);
        assert_eq!(provider.health_probes(), 2);
    }

    #[tokio::test]
    async fn test_slow_probe_times_out_as_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"id": "m"}]}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let settings = HttpSettings {
            probe_timeout: Duration::from_millis(50),
            ..HttpSettings::default()
        };
        let provider = GroqProvider::new(Some("gsk_test".to_string()), "m", &server.uri(), &settings);
        assert!(!provider.is_available().await);
    }

    #[tokio::test]
    async fn test_image_analysis_unsupported() {
        let provider = GroqProvider::new(
            Some("gsk_test".to_string()),
            "m",
            "http://127.0.0.1:9",
            &HttpSettings::default(),
        );
        let err = provider
            .analyze_image(&ImageInput::new(vec![1, 2, 3], "image/png"), "describe")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
        assert!(!provider.capabilities().supports_vision);
    }
}
