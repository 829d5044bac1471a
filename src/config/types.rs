use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filters used when `--filter` is not given
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub active_filters: Vec<String>,
    /// Out-of-process analyzers appended to every run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_analyzers: Vec<CustomAnalyzerConfig>,
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

/// A custom analyzer reachable over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAnalyzerConfig {
    pub name: String,
    pub url: String,
    pub port: u16,
}

/// AI backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Backend name (openai, anthropic, noop)
    pub backend: String,
    /// Model override, the backend default is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Language the explanations are written in
    pub language: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            model: None,
            language: "english".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Memory,
    #[default]
    File,
}

/// Explanation cache configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub kind: CacheKind,
    /// Directory for the file cache, defaults to the user cache dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub disabled: bool,
}

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_concurrency: usize,
    pub with_doc: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            with_doc: false,
        }
    }
}
