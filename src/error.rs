use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::kubernetes::ClusterError;

#[derive(Error, Debug)]
pub enum KubesageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("AI backend error: {0}")]
    Ai(#[from] crate::ai::AiError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

pub type Result<T> = std::result::Result<T, KubesageError>;
