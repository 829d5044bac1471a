//! # kubesage
//!
//! Scans a Kubernetes cluster for misconfigured or unhealthy resources and
//! optionally asks an AI backend to explain each finding.
//!
//! ## Features
//!
//! - **Analyzers**: per-kind checks for pods, services, ingresses, workloads, nodes and more
//! - **Filters**: run a chosen subset, or persist active filters in the config file
//! - **Bounded execution**: analyzers run concurrently under a configurable limit
//! - **Masking**: object names are replaced by placeholders before any prompt is sent
//! - **Caching**: explanations are cached in memory or on disk
//!
//! ## Example
//!
//! ```rust,no_run
//! use kubesage::{Analysis, OutputFormat};
//! use kubesage::kubernetes::InMemoryCluster;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut analysis = Analysis::new(Arc::new(InMemoryCluster::new()))
//!     .with_filters(vec!["Pod".into(), "Service".into()]);
//! analysis.run_analysis().await;
//! println!("{}", String::from_utf8_lossy(&analysis.print_output(OutputFormat::Text)?));
//! # Ok(())
//! # }
//! ```

pub mod ai;
pub mod analysis;
pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;
pub mod kubernetes;

// Re-export commonly used types and functions
pub use analysis::{Analysis, AnalysisError, OutputFormat};
pub use common::{AnalysisResult, Failure, Sensitive};
pub use error::{KubesageError, Result};
pub use handlers::*;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
