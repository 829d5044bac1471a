use async_trait::async_trait;
use log::{debug, warn};
use rig::{
    client::{CompletionClient, ProviderClient},
    completion::Prompt,
    providers::{anthropic, openai},
};

use super::{AiBackend, AiError};

const PREAMBLE: &str = "You are a Kubernetes expert. Answer briefly and only with the requested format.";
const MAX_TOKENS: u64 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
        }
    }
}

/// Hosted model reached through a rig agent.
#[derive(Debug, Clone)]
pub struct RigBackend {
    provider: Provider,
    model: String,
}

impl RigBackend {
    /// Fails when the provider's API key is not in the environment.
    pub fn new(provider: Provider, model: Option<String>) -> Result<Self, AiError> {
        if std::env::var(provider.api_key_var()).is_err() {
            warn!("{} not set", provider.api_key_var());
            return Err(AiError::MissingApiKey(provider.api_key_var().to_string()));
        }
        Ok(Self {
            provider,
            model: model.unwrap_or_else(|| provider.default_model().to_string()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiBackend for RigBackend {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        debug!("Prompting {} model {}", self.provider.name(), self.model);
        match self.provider {
            Provider::OpenAi => {
                let agent = openai::Client::from_env()
                    .agent(&self.model)
                    .preamble(PREAMBLE)
                    .max_tokens(MAX_TOKENS)
                    .build();
                agent
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))
            }
            Provider::Anthropic => {
                let agent = anthropic::Client::from_env()
                    .agent(&self.model)
                    .preamble(PREAMBLE)
                    .max_tokens(MAX_TOKENS)
                    .build();
                agent
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))
            }
        }
    }
}
