//! In-memory providers with scripted behaviour for router tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::llm::providers::{
    AiProvider, GenerateOptions, PrivacyLevel, ProviderCapabilities, ProviderError,
};


#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail,
    /// Replies after a fixed delay.
    Delayed(Duration, String),
    /// Sleeps past any sane call timeout.
    Hang,
}

pub struct ScriptedProvider {
    name: String,
    privacy_level: PrivacyLevel,
    priority: u8,
    available: AtomicBool,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(name: &str, privacy_level: PrivacyLevel, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            privacy_level,
            priority: 1,
            available: AtomicBool::new(true),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn cloud(name: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self::new(name, PrivacyLevel::Cloud, Behavior::Reply(reply.to_string())))
    }

    pub fn local(name: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self::new(name, PrivacyLevel::Local, Behavior::Reply(reply.to_string())))
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, PrivacyLevel::Cloud, Behavior::Fail))
    }

    pub fn hanging(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, PrivacyLevel::Cloud, Behavior::Hang))
    }

    pub fn delayed(name: &str, delay: Duration, reply: &str) -> Arc<Self> {
        Arc::new(Self::new(
            name,
            PrivacyLevel::Cloud,
            Behavior::Delayed(delay, reply.to_string()),
        ))
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            priority: self.priority,
            cost_per_token: 0.0,
            speed_rating: 5,
            privacy_level: self.privacy_level,
            supports_vision: false,
        }
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn generate_text(
        &self,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail => Err(ProviderError::Transport(format!("{} returned 503", self.name))),
            Behavior::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// Coerces a list of scripted providers into the registry type.
pub fn registry(providers: &[&Arc<ScriptedProvider>]) -> Vec<Arc<dyn AiProvider>> {
    providers
        .iter()
        .map(|p| Arc::clone(*p) as Arc<dyn AiProvider>)
        .collect()
}
