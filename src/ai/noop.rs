use async_trait::async_trait;

use super::{AiBackend, AiError};

/// Echoes the prompt back. Useful offline and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBackend;

#[async_trait]
impl AiBackend for NoOpBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        Ok(format!("I am a noop response to the prompt {}", prompt))
    }
}
