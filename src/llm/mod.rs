pub mod factory;
pub mod json;
pub mod providers;

pub use factory::{ProviderFactory, ProviderKind};
pub use json::extract_json;
pub use providers::{
    AiProvider, GenerateOptions, ImageInput, PrivacyLevel, ProviderCapabilities, ProviderError,
};
