use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::base::{
    AiProvider, GenerateOptions, ImageInput, PrivacyLevel, ProviderCapabilities, ProviderError,
    build_http_client, check_status,
};
use crate::core::{HealthCache, HttpSettings};
use crate::utils::normalize_base_url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}


pub struct GeminiProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f64,
    probe_timeout: Duration,
    client: Client,
    health: HealthCache,
}

impl GeminiProvider {

    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: &str,
        settings: &HttpSettings,
    ) -> Self {
        let model = model.into();
        info!(
            "Gemini provider initialized (model={}, configured={})",
            model,
            api_key.is_some()
        );
        Self {
            api_key,
            model,
            base_url: normalize_base_url(base_url),
            temperature: settings.temperature,
            probe_timeout: settings.probe_timeout,
            client: build_http_client(settings.request_timeout),
            health: HealthCache::new(settings.health_ttl),
        }
    }


    pub fn health_probes(&self) -> u64 {
        self.health.probe_count()
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("gemini API key missing".to_string()))
    }

    async fn probe(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };

        let result = async {
            let response = self
                .client
                .get(format!("{}/models", self.base_url))
                .header("x-goog-api-key", api_key)
                .timeout(self.probe_timeout)
                .send()
                .await?;
            let list = check_status(response)
                .await?
                .json::<GeminiModelList>()
                .await?;
            Ok::<_, ProviderError>(list.models)
        }
        .await;

        match result {
            Ok(models) => {
                let usable: Vec<&str> = models
                    .iter()
                    .filter(|m| {
                        m.supported_generation_methods
                            .iter()
                            .any(|method| method == "generateContent")
                    })
                    .map(|m| m.name.as_str())
                    .collect();
                debug!(
                    "gemini probe: {} models, usable={:?}",
                    models.len(),
                    usable
                );
                !usable.is_empty()
            }
            Err(e) => {
                debug!("gemini probe failed: {}", e);
                false
            }
        }
    }

    async fn generate_content(
        &self,
        parts: Vec<GeminiPart>,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: options.system_prompt.as_ref().map(|system| GeminiContent {
                role: None,
                parts: vec![text_part(system)],
            }),
            generation_config: GenerationConfig {
                temperature: options.temperature.unwrap_or(self.temperature),
                max_output_tokens: options.max_tokens,
                response_mime_type: options.json_mode.then_some("application/json"),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response)
            .await?
            .json::<GeminiResponse>()
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::Transport(
                "gemini returned no candidates".to_string(),
            ));
        }
        Ok(text)
    }
}

fn text_part(text: &str) -> GeminiPart {
    GeminiPart {
        text: Some(text.to_string()),
        inline_data: None,
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            priority: 3,
            cost_per_token: 0.000_000_075,
            speed_rating: 8,
            privacy_level: PrivacyLevel::Cloud,
            supports_vision: true,
        }
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_none() {
            return false;
        }
        self.health.get_or_probe(|| self.probe()).await
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.generate_content(vec![text_part(prompt)], options).await
    }

    async fn analyze_image(&self, image: &ImageInput, prompt: &str) -> Result<String, ProviderError> {
        let parts = vec![
            text_part(prompt),
            GeminiPart {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.to_base64(),
                }),
            },
        ];
        self.generate_content(parts, &GenerateOptions::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            Some("AIza-test".to_string()),
            "gemini-1.5-flash",
            &server.uri(),
            &HttpSettings::default(),
        )
    }

    fn candidate(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_text_posts_contents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Summarize interview notes"}]}],
                "systemInstruction": {"parts": [{"text": "Be concise."}]},
                "generationConfig": {"maxOutputTokens": 200}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Strong candidate.")))
            .expect(1)
            .mount(&server)
            .await;

        let options = GenerateOptions::default()
            .with_system_prompt("Be concise.")
            .with_max_tokens(200);
        let text = provider_for(&server)
            .generate_text("Summarize interview notes", &options)
            .await
            .unwrap();
        assert_eq!(text, "Strong candidate.");
    }

    #[tokio::test]
    async fn test_generate_json_requests_json_mime_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"fit\": \"high\"}")))
            .mount(&server)
            .await;

        let value = provider_for(&server)
            .generate_json("Rate fit", Some(&json!({"type": "object"})))
            .await
            .unwrap();
        assert_eq!(value, json!({"fit": "high"}));
    }

    #[tokio::test]
    async fn test_prose_without_object_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate("Sorry, I cannot help with that.")),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate_json("Rate fit", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate_text("hi", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[tokio::test]
    async fn test_probe_needs_generate_content_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}]
            })))
            .mount(&server)
            .await;

        assert!(!provider_for(&server).is_available().await);
    }

    #[tokio::test]
    async fn test_probe_succeeds_with_usable_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{
                    "name": "models/gemini-1.5-flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                }]
            })))
            .mount(&server)
            .await;

        assert!(provider_for(&server).is_available().await);
    }

    #[tokio::test]
    async fn test_analyze_image_sends_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(body_partial_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "Extract the name"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/"}}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Grace Hopper")))
            .mount(&server)
            .await;

        let image = ImageInput::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let text = provider_for(&server)
            .analyze_image(&image, "Extract the name")
            .await
            .unwrap();
        assert_eq!(text, "Grace Hopper");
    }
}
