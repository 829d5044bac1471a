use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{Endpoints, Node, PersistentVolumeClaim, Pod, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass, NetworkPolicy};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::{
    Client, Config, Resource,
    api::{Api, ListParams},
};
use log::trace;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use super::{ClusterClient, ClusterError};

/// Cluster client backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Create a client using the default kubeconfig or in-cluster config.
    pub async fn new() -> Result<Self, ClusterError> {
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    /// Create a client with a specific kubeconfig context.
    pub async fn with_context(context: &str) -> Result<Self, ClusterError> {
        let kubeconfig = kube::config::Kubeconfig::read()?;
        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &kube::config::KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            },
        )
        .await?;
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn list_namespaced<K>(&self, namespace: Option<&str>) -> Result<Vec<K>, ClusterError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        trace!(
            "Listing {} in {}",
            K::kind(&Default::default()),
            namespace.unwrap_or("all namespaces")
        );
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_cluster_scoped<K>(&self) -> Result<Vec<K>, ClusterError>
    where
        K: Resource + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::all(self.client.clone());
        Ok(api.list(&ListParams::default()).await?.items)
    }
}

#[async_trait]
impl ClusterClient for KubeClient {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Pod>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_services(&self, namespace: Option<&str>) -> Result<Vec<Service>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_endpoints(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Endpoints>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_ingresses(&self, namespace: Option<&str>) -> Result<Vec<Ingress>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_ingress_classes(&self) -> Result<Vec<IngressClass>, ClusterError> {
        self.list_cluster_scoped().await
    }

    async fn list_deployments(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<Deployment>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_replica_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<ReplicaSet>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_stateful_sets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<StatefulSet>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_persistent_volume_claims(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PersistentVolumeClaim>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_cron_jobs(&self, namespace: Option<&str>) -> Result<Vec<CronJob>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
        self.list_cluster_scoped().await
    }

    async fn list_horizontal_pod_autoscalers(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<HorizontalPodAutoscaler>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_pod_disruption_budgets(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<PodDisruptionBudget>, ClusterError> {
        self.list_namespaced(namespace).await
    }

    async fn list_network_policies(
        &self,
        namespace: Option<&str>,
    ) -> Result<Vec<NetworkPolicy>, ClusterError> {
        self.list_namespaced(namespace).await
    }
}
