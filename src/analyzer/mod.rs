//! # Analyzer Module
//!
//! Per-resource-kind analyzers. Each one lists a kind through the
//! [`ClusterClient`] and reports one [`AnalysisResult`] per flagged object.
//!
//! - **Core analyzers** run when no filter is given
//! - **Additional analyzers** only run when a filter names them
//! - **Custom analyzers** live out of process and are reached over HTTP

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::AnalysisResult;
use crate::kubernetes::{ClusterClient, ClusterError};

pub mod cron_job;
pub mod custom;
pub mod deployment;
pub mod docs;
pub mod hpa;
pub mod ingress;
pub mod network_policy;
pub mod node;
pub mod pdb;
pub mod pod;
pub mod pvc;
pub mod replica_set;
pub mod service;
pub mod stateful_set;
pub mod util;

pub use cron_job::CronJobAnalyzer;
pub use custom::HttpCustomAnalyzer;
pub use deployment::DeploymentAnalyzer;
pub use hpa::HpaAnalyzer;
pub use ingress::IngressAnalyzer;
pub use network_policy::NetworkPolicyAnalyzer;
pub use node::NodeAnalyzer;
pub use pdb::PdbAnalyzer;
pub use pod::PodAnalyzer;
pub use pvc::PvcAnalyzer;
pub use replica_set::ReplicaSetAnalyzer;
pub use service::ServiceAnalyzer;
pub use stateful_set::StatefulSetAnalyzer;

/// Error type for a single analyzer invocation.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("Custom analyzer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Custom analyzer returned status {status}: {body}")]
    CustomStatus { status: u16, body: String },

    #[error("{0}")]
    Internal(String),
}

/// Shared cancellation flag for a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything an analyzer needs for one invocation.
#[derive(Clone)]
pub struct AnalyzerContext {
    pub client: Arc<dyn ClusterClient>,
    /// `None` means all namespaces
    pub namespace: Option<String>,
    pub with_doc: bool,
    pub cancel: CancelToken,
}

impl AnalyzerContext {
    pub fn new(client: Arc<dyn ClusterClient>, namespace: Option<String>) -> Self {
        Self {
            client,
            namespace,
            with_doc: false,
            cancel: CancelToken::new(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Documentation hint, empty unless docs were requested.
    pub fn doc(&self, text: &str) -> String {
        if self.with_doc {
            text.to_string()
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Identifier used by filters and as the kind of every result.
    fn name(&self) -> &str;

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError>;
}

/// Analyzers that run when no filter is given, in execution order.
pub fn core_analyzers() -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(PodAnalyzer),
        Arc::new(DeploymentAnalyzer),
        Arc::new(ReplicaSetAnalyzer),
        Arc::new(PvcAnalyzer),
        Arc::new(ServiceAnalyzer),
        Arc::new(IngressAnalyzer),
        Arc::new(StatefulSetAnalyzer),
        Arc::new(CronJobAnalyzer),
        Arc::new(NodeAnalyzer),
    ]
}

/// Built-in analyzers that only run when selected by a filter.
pub fn additional_analyzers() -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(HpaAnalyzer),
        Arc::new(PdbAnalyzer),
        Arc::new(NetworkPolicyAnalyzer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_are_unique() {
        let mut names: Vec<String> = core_analyzers()
            .iter()
            .chain(additional_analyzers().iter())
            .map(|a| a.name().to_string())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
