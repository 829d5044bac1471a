use async_trait::async_trait;

use super::util::name_of;
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

const PRESSURE_CONDITIONS: &[&str] = &[
    "MemoryPressure",
    "DiskPressure",
    "PIDPressure",
    "NetworkUnavailable",
];

/// Flags nodes that are not ready or report resource pressure.
pub struct NodeAnalyzer;

#[async_trait]
impl Analyzer for NodeAnalyzer {
    fn name(&self) -> &str {
        "Node"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let nodes = ctx.client.list_nodes().await?;
        let mut results = Vec::new();

        for node in &nodes {
            let name = name_of(&node.metadata);
            let failures: Vec<Failure> = node
                .status
                .as_ref()
                .and_then(|s| s.conditions.as_ref())
                .into_iter()
                .flatten()
                .filter(|c| {
                    (c.type_ == "Ready" && c.status != "True")
                        || (PRESSURE_CONDITIONS.contains(&c.type_.as_str()) && c.status == "True")
                })
                .map(|c| {
                    Failure::new(format!(
                        "{} has condition of type {}, reason {}: {}",
                        name,
                        c.type_,
                        c.reason.as_deref().unwrap_or("Unknown"),
                        c.message.as_deref().unwrap_or_default()
                    ))
                    .with_doc(ctx.doc(docs::NODE_CONDITIONS))
                    .with_sensitive([name])
                })
                .collect();

            if !failures.is_empty() {
                results.push(AnalysisResult::new(self.name(), name).with_failures(failures));
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::core::v1::{Node, NodeCondition, NodeStatus};
    use kube::api::ObjectMeta;
    use std::sync::Arc;

    fn node(conditions: Vec<(&str, &str)>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some("node-1".into()),
                ..Default::default()
            },
            status: Some(NodeStatus {
                conditions: Some(
                    conditions
                        .into_iter()
                        .map(|(t, s)| NodeCondition {
                            type_: t.into(),
                            status: s.into(),
                            reason: Some("KubeletNotReady".into()),
                            message: Some("container runtime is down".into()),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_not_ready_node() {
        let cluster = InMemoryCluster::new().with(node(vec![("Ready", "False"), ("DiskPressure", "False")]));
        let ctx = AnalyzerContext::new(Arc::new(cluster), Some("default".into()));
        let results = NodeAnalyzer.analyze(&ctx).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "node-1");
        assert_eq!(
            results[0].error[0].text,
            "node-1 has condition of type Ready, reason KubeletNotReady: container runtime is down"
        );
    }

    #[tokio::test]
    async fn test_ready_node_is_healthy() {
        let cluster = InMemoryCluster::new().with(node(vec![("Ready", "True")]));
        let ctx = AnalyzerContext::new(Arc::new(cluster), None);
        assert!(NodeAnalyzer.analyze(&ctx).await.unwrap().is_empty());
    }
}
