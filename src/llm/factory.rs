use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::providers::{AiProvider, GeminiProvider, GroqProvider, OllamaProvider, OpenAiProvider};
use crate::core::AiConfig;


/// The closed set of backends this crate ships adapters for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProviderKind {
    Groq,
    Gemini,
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}


pub struct ProviderFactory;

impl ProviderFactory {

    #[must_use]
    pub fn create(kind: ProviderKind, config: &AiConfig) -> Arc<dyn AiProvider> {
        let settings = config.http_settings();
        match kind {
            ProviderKind::Groq => Arc::new(GroqProvider::new(
                config.groq_api_key.clone(),
                config.groq_model.clone(),
                &config.groq_base_url,
                &settings,
            )),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
                &config.gemini_base_url,
                &settings,
            )),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                &config.openai_base_url,
                &settings,
            )),
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(
                &config.ollama_url,
                config.ollama_model.clone(),
                &settings,
            )),
        }
    }

    /// One adapter per kind, in registration order. Providers without
    /// credentials are included and report themselves unavailable.
    #[must_use]
    pub fn create_all(config: &AiConfig) -> Vec<Arc<dyn AiProvider>> {
        ProviderKind::iter()
            .map(|kind| Self::create(kind, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::PrivacyLevel;
    use std::str::FromStr;

    #[test]
    fn test_kind_names_match_provider_names() {
        let config = AiConfig::new();
        for kind in ProviderKind::iter() {
            let provider = ProviderFactory::create(kind, &config);
            assert_eq!(provider.name(), kind.to_string());
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(ProviderKind::from_str("openai").unwrap(), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_str("Groq").unwrap(), ProviderKind::Groq);
        assert!(ProviderKind::from_str("cerebras").is_err());
    }

    #[test]
    fn test_create_all_registration_order() {
        let providers = ProviderFactory::create_all(&AiConfig::new());
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["groq", "gemini", "openai", "ollama"]);

        let local: Vec<&str> = providers
            .iter()
            .filter(|p| p.capabilities().privacy_level == PrivacyLevel::Local)
            .map(|p| p.name())
            .collect();
        assert_eq!(local, vec!["ollama"]);
    }

    #[tokio::test]
    async fn test_missing_keys_build_unavailable_providers() {
        let config = AiConfig::from_lookup(|_| None);
        let openai = ProviderFactory::create(ProviderKind::OpenAi, &config);
        let groq = ProviderFactory::create(ProviderKind::Groq, &config);
        let gemini = ProviderFactory::create(ProviderKind::Gemini, &config);
        assert!(!openai.is_available().await);
        assert!(!groq.is_available().await);
        assert!(!gemini.is_available().await);
    }
}
