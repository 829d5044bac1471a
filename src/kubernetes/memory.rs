use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{Endpoints, Node, PersistentVolumeClaim, Pod, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::Resource;
use std::collections::HashSet;

use super::{ClusterClient, ClusterError};

/// A fixed snapshot of cluster objects.
///
/// ```rust,ignore
/// let cluster = InMemoryCluster::new().with(pod).with(service);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    pods: Vec<Pod>,
    services: Vec<Service>,
    endpoints: Vec<Endpoints>,
    ingresses: Vec<Ingress>,
    ingress_classes: Vec<IngressClass>,
    deployments: Vec<Deployment>,
    replica_sets: Vec<ReplicaSet>,
    stateful_sets: Vec<StatefulSet>,
    persistent_volume_claims: Vec<PersistentVolumeClaim>,
    cron_jobs: Vec<CronJob>,
    nodes: Vec<Node>,
    horizontal_pod_autoscalers: Vec<HorizontalPodAutoscaler>,
    pod_disruption_budgets: Vec<PodDisruptionBudget>,
    network_policies: Vec<NetworkPolicy>,
    failing_kinds: HashSet<String>,
}

/// Objects that can be stored in an [`InMemoryCluster`].
pub trait ClusterObject {
    fn store(self, cluster: &mut InMemoryCluster);
}

macro_rules! cluster_object {
    ($ty:ty, $field:ident) => {
        impl ClusterObject for $ty {
            fn store(self, cluster: &mut InMemoryCluster) {
                cluster.$field.push(self);
            }
        }
    };
}

cluster_object!(Pod, pods);
cluster_object!(Service, services);
cluster_object!(Endpoints, endpoints);
cluster_object!(Ingress, ingresses);
cluster_object!(IngressClass, ingress_classes);
cluster_object!(Deployment, deployments);
cluster_object!(ReplicaSet, replica_sets);
cluster_object!(StatefulSet, stateful_sets);
cluster_object!(PersistentVolumeClaim, persistent_volume_claims);
cluster_object!(CronJob, cron_jobs);
cluster_object!(Node, nodes);
cluster_object!(HorizontalPodAutoscaler, horizontal_pod_autoscalers);
cluster_object!(PodDisruptionBudget, pod_disruption_budgets);
cluster_object!(NetworkPolicy, network_policies);

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, object: impl ClusterObject) -> Self {
        object.store(&mut self);
        self
    }

    /// Make every listing of `kind` (e.g. `"Service"`) fail.
    pub fn failing(mut self, kind: &str) -> Self {
        self.failing_kinds.insert(kind.to_string());
        self
    }

    fn check(&self, kind: &str) -> Result<(), ClusterError> {
        if self.failing_kinds.contains(kind) {
            return Err(ClusterError::ListFailed {
                kind: kind.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn select<K>(&self, kind: &str, items: &[K], namespace: Option<&str>) -> Result<Vec<K>, ClusterError>
    where
        K: Resource + Clone,
    {
        self.check(kind)?;
        Ok(items
            .iter()
            .filter(|item| match namespace {
                Some(ns) => item.meta().namespace.as_deref().unwrap_or("default") == ns,
                None => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        self.select("Pod", &self.pods, namespace)
    }

    async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<Service>, ClusterError> {
        self.select("Service", &self.services, namespace)
    }

    async fn list_endpoints(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Endpoints>, ClusterError> {
        self.select("Endpoints", &self.endpoints, namespace)
    }

    async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<Ingress>, ClusterError> {
        self.select("Ingress", &self.ingresses, namespace)
    }

    async fn list_ingress_classes(&self) -> Result<Vec<IngressClass>, ClusterError> {
        self.select("IngressClass", &self.ingress_classes, None)
    }

    async fn list_deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Deployment>, ClusterError> {
        self.select("Deployment", &self.deployments, namespace)
    }

    async fn list_replica_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<ReplicaSet>, ClusterError> {
        self.select("ReplicaSet", &self.replica_sets, namespace)
    }

    async fn list_stateful_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<StatefulSet>, ClusterError> {
        self.select("StatefulSet", &self.stateful_sets, namespace)
    }

    async fn list_persistent_volume_claims(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, ClusterError> {
        self.select(
            "PersistentVolumeClaim",
            &self.persistent_volume_claims,
            namespace,
        )
    }

    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, ClusterError> {
        self.select("CronJob", &self.cron_jobs, namespace)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        self.select("Node", &self.nodes, None)
    }

    async fn list_horizontal_pod_autoscalers(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<HorizontalPodAutoscaler>, ClusterError> {
        self.select(
            "HorizontalPodAutoscaler",
            &self.horizontal_pod_autoscalers,
            namespace,
        )
    }

    async fn list_pod_disruption_budgets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PodDisruptionBudget>, ClusterError> {
        self.select(
            "PodDisruptionBudget",
            &self.pod_disruption_budgets,
            namespace,
        )
    }

    async fn list_network_policies(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<NetworkPolicy>, ClusterError> {
        self.select("NetworkPolicy", &self.network_policies, namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn pod(name: &str, namespace: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_namespace() {
        let cluster = InMemoryCluster::new()
            .with(pod("a", "default"))
            .with(pod("b", "kube-system"));

        assert_eq!(cluster.list_pods(Some("default")).await.unwrap().len(), 1);
        assert_eq!(cluster.list_pods(None).await.unwrap().len(), 2);
        assert!(cluster.list_services(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_kind_returns_error() {
        let cluster = InMemoryCluster::new().with(pod("a", "default")).failing("Pod");
        let err = cluster.list_pods(None).await.unwrap_err();
        assert!(err.to_string().contains("Pod"));
    }
}
