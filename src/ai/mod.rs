//! AI backends that turn a sanitized failure description into an explanation.

pub mod noop;
pub mod prompts;
pub mod rig_backend;

pub use noop::NoOpBackend;
pub use rig_backend::{Provider, RigBackend};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::types::AiConfig;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("{0} environment variable is not set")]
    MissingApiKey(String),

    #[error("Completion failed: {0}")]
    Provider(String),

    #[error("Unknown AI backend: {0}. Available: noop, openai, anthropic")]
    UnknownBackend(String),
}

#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Provider name, part of every cache key.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Build the backend named in the configuration.
pub fn new_backend(config: &AiConfig) -> Result<Arc<dyn AiBackend>, AiError> {
    let backend: Arc<dyn AiBackend> = match config.backend.to_lowercase().as_str() {
        "noop" => Arc::new(NoOpBackend),
        "openai" => Arc::new(RigBackend::new(Provider::OpenAi, config.model.clone())?),
        "anthropic" => Arc::new(RigBackend::new(Provider::Anthropic, config.model.clone())?),
        other => return Err(AiError::UnknownBackend(other.to_string())),
    };
    Ok(backend)
}
