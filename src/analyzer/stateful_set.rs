use async_trait::async_trait;
use std::collections::HashSet;

use super::util::{name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

/// Flags stateful sets with a missing governing service or unready replicas.
pub struct StatefulSetAnalyzer;

#[async_trait]
impl Analyzer for StatefulSetAnalyzer {
    fn name(&self) -> &str {
        "StatefulSet"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let stateful_sets = ctx.client.list_stateful_sets(ctx.namespace()).await?;
        if stateful_sets.is_empty() {
            return Ok(Vec::new());
        }
        let services: HashSet<(String, String)> = ctx
            .client
            .list_services(ctx.namespace())
            .await?
            .iter()
            .map(|s| {
                (
                    namespace_of(&s.metadata).to_string(),
                    name_of(&s.metadata).to_string(),
                )
            })
            .collect();

        let mut results = Vec::new();
        for sts in &stateful_sets {
            let namespace = namespace_of(&sts.metadata);
            let name = name_of(&sts.metadata);
            let mut failures = Vec::new();

            if let Some(spec) = &sts.spec {
                let service = spec.service_name.as_deref().unwrap_or_default();
                if !service.is_empty()
                    && !services.contains(&(namespace.to_string(), service.to_string()))
                {
                    failures.push(
                        Failure::new(format!(
                            "StatefulSet uses the service {}/{} which does not exist.",
                            namespace, service
                        ))
                        .with_doc(ctx.doc(docs::STATEFUL_SET_SERVICE))
                        .with_sensitive([namespace, service]),
                    );
                }

                let desired = spec.replicas.unwrap_or(1);
                let ready = sts
                    .status
                    .as_ref()
                    .and_then(|s| s.ready_replicas)
                    .unwrap_or(0);
                if ready < desired {
                    failures.push(
                        Failure::new(format!(
                            "StatefulSet {}/{} has {} replicas but {} are ready",
                            namespace, name, desired, ready
                        ))
                        .with_sensitive([namespace, name]),
                    );
                }
            }

            if !failures.is_empty() {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&sts.metadata))
                        .with_failures(failures),
                );
            }
        }
        Ok(results)
    }
}
