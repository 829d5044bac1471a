use async_trait::async_trait;

use super::util::{label_values, labels_to_string, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags disruption budgets that currently forbid any disruption.
pub struct PdbAnalyzer;

#[async_trait]
impl Analyzer for PdbAnalyzer {
    fn name(&self) -> &str {
        "PodDisruptionBudget"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let budgets = ctx
            .client
            .list_pod_disruption_budgets(ctx.namespace())
            .await?;
        let mut results = Vec::new();

        for pdb in &budgets {
            let blocked = pdb
                .status
                .as_ref()
                .and_then(|s| s.conditions.as_ref())
                .into_iter()
                .flatten()
                .find(|c| c.type_ == "DisruptionAllowed" && c.status == "False");
            let Some(condition) = blocked else { continue };

            let labels = pdb
                .spec
                .as_ref()
                .and_then(|s| s.selector.as_ref())
                .and_then(|s| s.match_labels.clone())
                .unwrap_or_default();
            let text = if labels.is_empty() {
                format!("{}: {}", condition.reason, condition.message)
            } else {
                format!(
                    "{}: {} expected pod labels {}",
                    condition.reason,
                    condition.message,
                    labels_to_string(&labels)
                )
            };
            let failure = Failure::new(text)
                .with_doc(ctx.doc(docs::PDB_SELECTOR))
                .with_sensitive(label_values(&labels));

            results.push(
                AnalysisResult::new(self.name(), qualified_name(&pdb.metadata))
                    .with_failures(vec![failure]),
            );
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::policy::v1::PodDisruptionBudget;
    use serde_json::json;
    use std::sync::Arc;

    fn pdb(allowed: &str) -> PodDisruptionBudget {
        serde_json::from_value(json!({
            "metadata": { "name": "web-pdb", "namespace": "default" },
            "spec": { "minAvailable": 2, "selector": { "matchLabels": { "app": "web" } } },
            "status": {
                "currentHealthy": 1,
                "desiredHealthy": 2,
                "disruptionsAllowed": 0,
                "expectedPods": 1,
                "conditions": [{
                    "type": "DisruptionAllowed",
                    "status": allowed,
                    "reason": "InsufficientPods",
                    "message": "not enough healthy pods",
                    "lastTransitionTime": "2024-01-01T00:00:00Z"
                }]
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_blocked_budget_is_reported() {
        let ctx = AnalyzerContext::new(Arc::new(InMemoryCluster::new().with(pdb("False"))), None);
        let results = PdbAnalyzer.analyze(&ctx).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "default/web-pdb");
        assert_eq!(
            results[0].error[0].text,
            "InsufficientPods: not enough healthy pods expected pod labels app=web"
        );
        assert_eq!(results[0].error[0].sensitive.len(), 2);
    }

    #[tokio::test]
    async fn test_allowed_budget_is_healthy() {
        let ctx = AnalyzerContext::new(Arc::new(InMemoryCluster::new().with(pdb("True"))), None);
        assert!(PdbAnalyzer.analyze(&ctx).await.unwrap().is_empty());
    }
}
