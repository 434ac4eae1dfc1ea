//! Routes AI text and JSON generation across cloud and local LLM providers
//! with task-aware selection, privacy-restricted routing, ordered fallback
//! and per-provider health statistics.

pub mod core;
pub mod llm;
pub mod router;
pub mod utils;

pub use utils::{safe_truncate, safe_truncate_ellipsis};


pub use core::config::AiConfig;
pub use core::error::{Result, RouterError};
pub use llm::providers::{AiProvider, GenerateOptions, ImageInput, PrivacyLevel, ProviderError};
pub use router::{
    Generated, HealthReport, HealthState, Priority, ProviderStatus, ResponseTime, Router,
    RouterConfig, TaskContext, TaskType,
};


pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";


pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";


pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";


pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";


pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";


pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";


pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;


pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// How long a probe result is trusted before the next one.
pub const DEFAULT_HEALTH_TTL_SECS: u64 = 30;

/// Upper bound on one provider attempt inside the router.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;
