//! # Analysis
//!
//! One diagnostic run: select analyzers, execute them under a concurrency
//! bound, optionally explain the findings through an AI backend, and render
//! the outcome.
//!
//! ```rust,no_run
//! use kubesage::analysis::{Analysis, OutputFormat};
//! use kubesage::kubernetes::KubeClient;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KubeClient::new().await?;
//! let mut analysis = Analysis::new(Arc::new(client)).with_namespace(Some("default".into()));
//! analysis.run_analysis().await;
//! let output = analysis.print_output(OutputFormat::Json)?;
//! println!("{}", String::from_utf8_lossy(&output));
//! # Ok(())
//! # }
//! ```

pub mod enrich;
pub mod executor;
pub mod output;
pub mod selector;

#[cfg(test)]
pub(crate) mod log_capture;

pub use executor::{AnalysisStats, ExecutionReport, execute};
pub use output::{JsonOutput, OutputFormat, Status};
pub use selector::{AnalyzerRegistry, AvailableAnalyzers, Selection, SelectionTier, select_analyzers};

use log::{debug, info};
use std::sync::Arc;

use crate::ai::AiBackend;
use crate::analyzer::{Analyzer, AnalyzerContext, CancelToken};
use crate::cache::{Cache, MemoryCache};
use crate::common::AnalysisResult;
use crate::kubernetes::ClusterClient;

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_LANGUAGE: &str = "english";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No AI backend configured")]
    NoBackend,

    #[error("{provider} backend failed: {message}")]
    Backend { provider: String, message: String },

    #[error("{provider} quota exhausted: {message}")]
    QuotaExhausted { provider: String, message: String },

    #[error("Failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize YAML output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// State of one run. Results, errors and stats accumulate as the run
/// progresses.
pub struct Analysis {
    pub namespace: Option<String>,
    pub filters: Vec<String>,
    pub active_filters: Vec<String>,
    pub max_concurrency: usize,
    pub language: String,
    pub with_doc: bool,
    pub with_stats: bool,
    pub registry: AnalyzerRegistry,
    pub client: Arc<dyn ClusterClient>,
    pub backend: Option<Arc<dyn AiBackend>>,
    pub cache: Arc<dyn Cache>,
    pub cancel: CancelToken,
    pub results: Vec<AnalysisResult>,
    pub errors: Vec<String>,
    pub stats: Vec<AnalysisStats>,
    explained_by: Option<String>,
}

impl Analysis {
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            namespace: None,
            filters: Vec::new(),
            active_filters: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            language: DEFAULT_LANGUAGE.to_string(),
            with_doc: false,
            with_stats: false,
            registry: AnalyzerRegistry::new(),
            client,
            backend: None,
            cache: Arc::new(MemoryCache::new("memory")),
            cancel: CancelToken::new(),
            results: Vec::new(),
            errors: Vec::new(),
            stats: Vec::new(),
            explained_by: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_active_filters(mut self, active: Vec<String>) -> Self {
        self.active_filters = active;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_doc(mut self, with_doc: bool) -> Self {
        self.with_doc = with_doc;
        self
    }

    pub fn with_stats(mut self, with_stats: bool) -> Self {
        self.with_stats = with_stats;
        self
    }

    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn AiBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn context(&self) -> AnalyzerContext {
        AnalyzerContext {
            client: Arc::clone(&self.client),
            namespace: self.namespace.clone(),
            with_doc: self.with_doc,
            cancel: self.cancel.clone(),
        }
    }

    fn absorb(&mut self, report: ExecutionReport) {
        self.results.extend(report.results);
        self.errors.extend(report.errors);
        self.stats.extend(report.stats);
    }

    /// Run the selected built-in analyzers, then the custom ones.
    pub async fn run_analysis(&mut self) {
        let selection = select_analyzers(&self.registry, &self.filters, &self.active_filters);
        info!(
            "Running analyzers [{}] ({:?} selection)",
            selection.ids().join(", "),
            selection.tier
        );
        let report = execute(&selection.builtin, &self.context(), self.max_concurrency).await;
        self.absorb(report);
        self.run_custom(&selection.custom).await;
    }

    /// Run every registered custom analyzer with the same engine.
    pub async fn run_custom_analysis(&mut self) {
        let custom = self.registry.custom().to_vec();
        self.run_custom(&custom).await;
    }

    async fn run_custom(&mut self, custom: &[Arc<dyn Analyzer>]) {
        if custom.is_empty() {
            debug!("Debug: No custom analyzers found.");
            return;
        }
        let report = execute(custom, &self.context(), self.max_concurrency).await;
        self.absorb(report);
    }

    /// Total number of failures across all results.
    pub fn problems(&self) -> usize {
        self.results.iter().map(|r| r.error.len()).sum()
    }
}
