pub mod base;
pub mod gemini;
pub mod groq;
pub mod ollama;
pub mod openai;
mod openai_compat;

pub use base::{
    AiProvider, GenerateOptions, ImageInput, PrivacyLevel, ProviderCapabilities, ProviderError,
};
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
