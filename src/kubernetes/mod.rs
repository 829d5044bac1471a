//! Read-only access to cluster resources.
//!
//! Analyzers only see the [`ClusterClient`] trait. [`KubeClient`] talks to a
//! real API server through kubeconfig, [`InMemoryCluster`] serves a fixed set
//! of objects.

pub mod client;
pub mod memory;

pub use client::KubeClient;
pub use memory::{ClusterObject, InMemoryCluster};

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{Endpoints, Node, PersistentVolumeClaim, Pod, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;

/// Error type for cluster access.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    Config(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("Failed to list {kind}: {message}")]
    ListFailed { kind: String, message: String },
}

/// Listing of resources by kind. `None` as namespace means all namespaces.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError>;

    async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<Service>, ClusterError>;

    async fn list_endpoints(&self, namespace: Option<&str>)
    -> Result<Vec<Endpoints>, ClusterError>;

    async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<Ingress>, ClusterError>;

    async fn list_ingress_classes(&self) -> Result<Vec<IngressClass>, ClusterError>;

    async fn list_deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Deployment>, ClusterError>;

    async fn list_replica_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<ReplicaSet>, ClusterError>;

    async fn list_stateful_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<StatefulSet>, ClusterError>;

    async fn list_persistent_volume_claims(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, ClusterError>;

    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, ClusterError>;

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError>;

    async fn list_horizontal_pod_autoscalers(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<HorizontalPodAutoscaler>, ClusterError>;

    async fn list_pod_disruption_budgets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PodDisruptionBudget>, ClusterError>;

    async fn list_network_policies(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<NetworkPolicy>, ClusterError>;
}
