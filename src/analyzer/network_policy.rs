use async_trait::async_trait;
use k8s_openapi::api::networking::v1::NetworkPolicy;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

use super::util::{name_of, namespace_of, qualified_name, selector_matches};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags policies that select every pod or no pod at all.
pub struct NetworkPolicyAnalyzer;

#[async_trait]
impl Analyzer for NetworkPolicyAnalyzer {
    fn name(&self) -> &str {
        "NetworkPolicy"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let policies = ctx.client.list_network_policies(ctx.namespace()).await?;
        if policies.is_empty() {
            return Ok(Vec::new());
        }
        let pods = ctx.client.list_pods(ctx.namespace()).await?;

        let mut results = Vec::new();
        for policy in &policies {
            let name = name_of(&policy.metadata);
            let namespace = namespace_of(&policy.metadata);
            let selector = pod_selector(policy);
            let match_labels = selector.match_labels.unwrap_or_default();
            let has_expressions = selector
                .match_expressions
                .as_ref()
                .is_some_and(|e| !e.is_empty());

            let text = if match_labels.is_empty() && !has_expressions {
                format!("Network policy allows traffic to all pods: {}", name)
            } else {
                // Expression selectors are not evaluated, only label equality.
                let applied = has_expressions
                    || pods.iter().any(|pod| {
                        namespace_of(&pod.metadata) == namespace
                            && selector_matches(&match_labels, pod.metadata.labels.as_ref())
                    });
                if applied {
                    continue;
                }
                format!("Network policy is not applied to any pods: {}", name)
            };

            results.push(
                AnalysisResult::new(self.name(), qualified_name(&policy.metadata)).with_failures(
                    vec![
                        Failure::new(text)
                            .with_doc(ctx.doc(docs::NETWORK_POLICY_SELECTOR))
                            .with_sensitive([name]),
                    ],
                ),
            );
        }
        Ok(results)
    }
}

/// The policy's pod selector, read through its wire form so an absent and an
/// empty selector look the same.
fn pod_selector(policy: &NetworkPolicy) -> LabelSelector {
    policy
        .spec
        .as_ref()
        .and_then(|spec| serde_json::to_value(spec).ok())
        .and_then(|mut value| value.get_mut("podSelector").map(serde_json::Value::take))
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}
