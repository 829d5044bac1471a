use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use std::collections::HashMap;

use super::util::{label_values, labels_to_string, name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

const LEADER_ELECTION_ANNOTATION: &str = "control-plane.alpha.kubernetes.io/leader";

/// Flags services whose selector matches no ready endpoint.
pub struct ServiceAnalyzer;

#[async_trait]
impl Analyzer for ServiceAnalyzer {
    fn name(&self) -> &str {
        "Service"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let services = ctx.client.list_services(ctx.namespace()).await?;
        let endpoints = ctx.client.list_endpoints(ctx.namespace()).await?;
        let by_name: HashMap<(&str, &str), &Endpoints> = endpoints
            .iter()
            .map(|ep| ((namespace_of(&ep.metadata), name_of(&ep.metadata)), ep))
            .collect();

        let mut results = Vec::new();
        for svc in &services {
            let key = (namespace_of(&svc.metadata), name_of(&svc.metadata));
            let failures = service_failures(svc, by_name.get(&key).copied(), ctx);
            if !failures.is_empty() {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&svc.metadata))
                        .with_failures(failures),
                );
            }
        }
        Ok(results)
    }
}

fn service_failures(svc: &Service, endpoints: Option<&Endpoints>, ctx: &AnalyzerContext) -> Vec<Failure> {
    let Some(spec) = &svc.spec else {
        return Vec::new();
    };
    if spec.type_.as_deref() == Some("ExternalName") {
        return Vec::new();
    }
    let Some(selector) = spec.selector.as_ref().filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    if let Some(ep) = endpoints {
        let leader_lock = ep
            .metadata
            .annotations
            .as_ref()
            .is_some_and(|a| a.contains_key(LEADER_ELECTION_ANNOTATION));
        if leader_lock {
            return Vec::new();
        }
    }

    let subsets = endpoints.and_then(|ep| ep.subsets.as_ref());
    let ready = subsets
        .into_iter()
        .flatten()
        .flat_map(|s| s.addresses.iter().flatten())
        .count();
    let not_ready: Vec<String> = subsets
        .into_iter()
        .flatten()
        .flat_map(|s| s.not_ready_addresses.iter().flatten())
        .map(|addr| {
            addr.target_ref
                .as_ref()
                .and_then(|r| r.name.clone())
                .unwrap_or_else(|| addr.ip.clone())
        })
        .collect();

    if ready == 0 && not_ready.is_empty() {
        return vec![
            Failure::new(format!(
                "Service has no endpoints, expected label {}",
                labels_to_string(selector)
            ))
            .with_doc(ctx.doc(docs::SERVICE_SELECTOR))
            .with_sensitive(label_values(selector)),
        ];
    }

    if !not_ready.is_empty() {
        return vec![
            Failure::new(format!(
                "Service has not ready endpoints, pods: [{}], expected {}",
                not_ready.join(", "),
                ready + not_ready.len()
            ))
            .with_sensitive(not_ready),
        ];
    }

    Vec::new()
}
