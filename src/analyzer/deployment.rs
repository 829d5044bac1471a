use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;

use super::util::{name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags deployments with fewer available replicas than desired.
pub struct DeploymentAnalyzer;

#[async_trait]
impl Analyzer for DeploymentAnalyzer {
    fn name(&self) -> &str {
        "Deployment"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let deployments = ctx.client.list_deployments(ctx.namespace()).await?;
        Ok(deployments
            .iter()
            .filter_map(|d| {
                let failure = replica_failure(d, ctx)?;
                Some(
                    AnalysisResult::new(self.name(), qualified_name(&d.metadata))
                        .with_failures(vec![failure]),
                )
            })
            .collect())
    }
}

fn replica_failure(deployment: &Deployment, ctx: &AnalyzerContext) -> Option<Failure> {
    let desired = deployment.spec.as_ref()?.replicas.unwrap_or(1);
    let available = deployment
        .status
        .as_ref()
        .and_then(|s| s.available_replicas)
        .unwrap_or(0);
    if available >= desired {
        return None;
    }

    let namespace = namespace_of(&deployment.metadata);
    let name = name_of(&deployment.metadata);
    Some(
        Failure::new(format!(
            "Deployment {}/{} has {} replicas but {} are available",
            namespace, name, desired, available
        ))
        .with_doc(ctx.doc(docs::DEPLOYMENT_REPLICAS))
        .with_sensitive([namespace, name]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
    use kube::api::ObjectMeta;
    use std::sync::Arc;

    fn deployment(desired: i32, available: Option<i32>) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("web".into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(desired),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                available_replicas: available,
                ..Default::default()
            }),
        }
    }

    async fn run(d: Deployment) -> Vec<AnalysisResult> {
        let ctx = AnalyzerContext::new(Arc::new(InMemoryCluster::new().with(d)), None);
        DeploymentAnalyzer.analyze(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_unavailable_replicas_are_reported() {
        let results = run(deployment(3, Some(1))).await;
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].error[0].text,
            "Deployment default/web has 3 replicas but 1 are available"
        );
    }

    #[tokio::test]
    async fn test_fully_available_deployment_is_healthy() {
        assert!(run(deployment(2, Some(2))).await.is_empty());
        assert!(run(deployment(0, None)).await.is_empty());
    }
}
