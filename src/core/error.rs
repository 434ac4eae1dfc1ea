use thiserror::Error;

use crate::llm::providers::ProviderError;
use crate::router::TaskType;


/// Errors that reach feature code calling the router.
///
/// Callers should treat both `NoProviderAvailable` and
/// `AllProvidersExhausted` as degradable: skip or stub the AI-assisted part
/// instead of failing the surrounding business operation.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No AI provider available for {task_type} task")]
    NoProviderAvailable { task_type: TaskType },

    #[error("All AI providers failed (attempted: {}): {last_error}", .attempted.join(", "))]
    AllProvidersExhausted {
        attempted: Vec<String>,
        #[source]
        last_error: ProviderError,
    },

    #[error("Failed to decode AI response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RouterError {
    /// Whether the caller should fall back to its non-AI path.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::NoProviderAvailable { .. } | Self::AllProvidersExhausted { .. } | Self::Decode(_)
        )
    }
}

impl From<config::ConfigError> for RouterError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}


pub type Result<T> = std::result::Result<T, RouterError>;
