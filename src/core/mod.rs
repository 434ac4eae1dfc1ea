pub mod cache;
pub mod config;
pub mod error;

pub use cache::HealthCache;
pub use config::{AiConfig, HttpSettings};
pub use error::{Result, RouterError};
