use async_trait::async_trait;

use super::util::qualified_name;
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags replica sets that cannot create their pods.
pub struct ReplicaSetAnalyzer;

#[async_trait]
impl Analyzer for ReplicaSetAnalyzer {
    fn name(&self) -> &str {
        "ReplicaSet"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let replica_sets = ctx.client.list_replica_sets(ctx.namespace()).await?;
        let mut results = Vec::new();

        for rs in &replica_sets {
            let Some(status) = &rs.status else { continue };
            if status.replicas != 0 {
                continue;
            }
            let failures: Vec<Failure> = status
                .conditions
                .iter()
                .flatten()
                .filter(|c| c.type_ == "ReplicaFailure" && c.reason.as_deref() == Some("FailedCreate"))
                .map(|c| {
                    Failure::new(c.message.clone().unwrap_or_else(|| "FailedCreate".to_string()))
                        .with_doc(ctx.doc(docs::REPLICA_SET_FAILURE))
                })
                .collect();
            if !failures.is_empty() {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&rs.metadata))
                        .with_failures(failures),
                );
            }
        }
        Ok(results)
    }
}
