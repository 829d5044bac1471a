use async_trait::async_trait;

use super::util::{name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags claims stuck in `Pending` or that lost their volume.
pub struct PvcAnalyzer;

#[async_trait]
impl Analyzer for PvcAnalyzer {
    fn name(&self) -> &str {
        "PersistentVolumeClaim"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let claims = ctx
            .client
            .list_persistent_volume_claims(ctx.namespace())
            .await?;
        let mut results = Vec::new();

        for pvc in &claims {
            let namespace = namespace_of(&pvc.metadata);
            let name = name_of(&pvc.metadata);
            let phase = pvc.status.as_ref().and_then(|s| s.phase.as_deref());
            let spec = pvc.spec.as_ref();

            let text = match phase {
                Some("Pending") => match spec.and_then(|s| s.storage_class_name.as_deref()) {
                    Some(class) => format!(
                        "PersistentVolumeClaim {}/{} is pending, storage class {} has not provisioned a volume",
                        namespace, name, class
                    ),
                    None => format!(
                        "PersistentVolumeClaim {}/{} is pending and does not request a storage class",
                        namespace, name
                    ),
                },
                Some("Lost") => format!(
                    "PersistentVolumeClaim {}/{} has lost its bound volume {}",
                    namespace,
                    name,
                    spec.and_then(|s| s.volume_name.as_deref()).unwrap_or("<unknown>")
                ),
                _ => continue,
            };

            results.push(
                AnalysisResult::new(self.name(), qualified_name(&pvc.metadata)).with_failures(vec![
                    Failure::new(text)
                        .with_doc(ctx.doc(docs::PVC_PHASE))
                        .with_sensitive([namespace, name]),
                ]),
            );
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::core::v1::{
        PersistentVolumeClaim, PersistentVolumeClaimSpec, PersistentVolumeClaimStatus,
    };
    use kube::api::ObjectMeta;
    use std::sync::Arc;

    fn claim(phase: &str, class: Option<&str>) -> PersistentVolumeClaim {
        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some("data".into()),
                namespace: Some("db".into()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                storage_class_name: class.map(String::from),
                ..Default::default()
            }),
            status: Some(PersistentVolumeClaimStatus {
                phase: Some(phase.into()),
                ..Default::default()
            }),
        }
    }

    async fn run(pvc: PersistentVolumeClaim) -> Vec<AnalysisResult> {
        let ctx = AnalyzerContext::new(Arc::new(InMemoryCluster::new().with(pvc)), None);
        PvcAnalyzer.analyze(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_pending_claim() {
        let results = run(claim("Pending", Some("fast"))).await;
        assert_eq!(results[0].kind, "PersistentVolumeClaim");
        assert_eq!(
            results[0].error[0].text,
            "PersistentVolumeClaim db/data is pending, storage class fast has not provisioned a volume"
        );
    }

    #[tokio::test]
    async fn test_bound_claim_is_healthy() {
        assert!(run(claim("Bound", None)).await.is_empty());
    }
}
