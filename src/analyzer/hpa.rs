use async_trait::async_trait;

use super::util::{name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags autoscalers whose scale target is missing or unsupported.
pub struct HpaAnalyzer;

#[async_trait]
impl Analyzer for HpaAnalyzer {
    fn name(&self) -> &str {
        "HorizontalPodAutoScaler"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let autoscalers = ctx
            .client
            .list_horizontal_pod_autoscalers(ctx.namespace())
            .await?;
        if autoscalers.is_empty() {
            return Ok(Vec::new());
        }

        let mut targets: Vec<(&'static str, String, String)> = Vec::new();
        for d in ctx.client.list_deployments(ctx.namespace()).await? {
            targets.push(key("Deployment", &d.metadata));
        }
        for rs in ctx.client.list_replica_sets(ctx.namespace()).await? {
            targets.push(key("ReplicaSet", &rs.metadata));
        }
        for sts in ctx.client.list_stateful_sets(ctx.namespace()).await? {
            targets.push(key("StatefulSet", &sts.metadata));
        }

        let mut results = Vec::new();
        for hpa in &autoscalers {
            let Some(spec) = &hpa.spec else { continue };
            let namespace = namespace_of(&hpa.metadata);
            let target = &spec.scale_target_ref;

            let failure = if !matches!(
                target.kind.as_str(),
                "Deployment" | "ReplicaSet" | "StatefulSet"
            ) {
                Some(
                    Failure::new(format!(
                        "HorizontalPodAutoscaler uses {} as ScaleTargetRef which is not an option.",
                        target.kind
                    ))
                    .with_doc(ctx.doc(docs::HPA_TARGET)),
                )
            } else if !targets.iter().any(|(k, ns, n)| {
                *k == target.kind && ns == namespace && *n == target.name
            }) {
                Some(
                    Failure::new(format!(
                        "HorizontalPodAutoscaler uses {}/{} as ScaleTargetRef which does not exist.",
                        target.kind, target.name
                    ))
                    .with_doc(ctx.doc(docs::HPA_TARGET))
                    .with_sensitive([target.name.as_str()]),
                )
            } else {
                None
            };

            if let Some(failure) = failure {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&hpa.metadata))
                        .with_failures(vec![failure]),
                );
            }
        }
        Ok(results)
    }
}

fn key(
    kind: &'static str,
    meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
) -> (&'static str, String, String) {
    (
        kind,
        namespace_of(meta).to_string(),
        name_of(meta).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
    use serde_json::json;
    use std::sync::Arc;

    fn hpa(kind: &str, target: &str) -> HorizontalPodAutoscaler {
        serde_json::from_value(json!({
            "metadata": { "name": "web", "namespace": "default" },
            "spec": {
                "maxReplicas": 5,
                "scaleTargetRef": { "apiVersion": "apps/v1", "kind": kind, "name": target }
            }
        }))
        .unwrap()
    }

    fn deployment(name: &str) -> Deployment {
        serde_json::from_value(json!({
            "metadata": { "name": name, "namespace": "default" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_scale_target() {
        let cluster = InMemoryCluster::new()
            .with(hpa("Deployment", "api"))
            .with(deployment("web"));
        let ctx = AnalyzerContext::new(Arc::new(cluster), None);
        let results = HpaAnalyzer.analyze(&ctx).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].error[0].text,
            "HorizontalPodAutoscaler uses Deployment/api as ScaleTargetRef which does not exist."
        );
    }

    #[tokio::test]
    async fn test_existing_target_and_unsupported_kind() {
        let cluster = InMemoryCluster::new()
            .with(hpa("Deployment", "web"))
            .with(deployment("web"));
        let ctx = AnalyzerContext::new(Arc::new(cluster), None);
        assert!(HpaAnalyzer.analyze(&ctx).await.unwrap().is_empty());

        let cluster = InMemoryCluster::new().with(hpa("DaemonSet", "agent"));
        let ctx = AnalyzerContext::new(Arc::new(cluster), None);
        let results = HpaAnalyzer.analyze(&ctx).await.unwrap();
        assert!(results[0].error[0].text.contains("which is not an option"));
    }
}
