use async_trait::async_trait;
use k8s_openapi::api::networking::v1::{Ingress, IngressBackend};
use std::collections::HashSet;

use super::util::{name_of, namespace_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

/// Flags ingresses without a usable class or pointing at missing services.
pub struct IngressAnalyzer;

#[async_trait]
impl Analyzer for IngressAnalyzer {
    fn name(&self) -> &str {
        "Ingress"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let ingresses = ctx.client.list_ingresses(ctx.namespace()).await?;
        if ingresses.is_empty() {
            return Ok(Vec::new());
        }
        let classes: HashSet<String> = ctx
            .client
            .list_ingress_classes()
            .await?
            .into_iter()
            .filter_map(|c| c.metadata.name)
            .collect();
        let services: HashSet<(String, String)> = ctx
            .client
            .list_services(ctx.namespace())
            .await?
            .into_iter()
            .map(|s| {
                (
                    namespace_of(&s.metadata).to_string(),
                    name_of(&s.metadata).to_string(),
                )
            })
            .collect();

        let mut results = Vec::new();
        for ingress in &ingresses {
            let failures = ingress_failures(ingress, &classes, &services, ctx);
            if !failures.is_empty() {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&ingress.metadata))
                        .with_failures(failures),
                );
            }
        }
        Ok(results)
    }
}

fn ingress_failures(
    ingress: &Ingress,
    classes: &HashSet<String>,
    services: &HashSet<(String, String)>,
    ctx: &AnalyzerContext,
) -> Vec<Failure> {
    let namespace = namespace_of(&ingress.metadata);
    let name = name_of(&ingress.metadata);
    let spec = ingress.spec.as_ref();
    let mut failures = Vec::new();

    let class_name = spec.and_then(|s| s.ingress_class_name.as_deref());
    let class_annotation = ingress
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(INGRESS_CLASS_ANNOTATION));
    match (class_name, class_annotation) {
        (Some(class), _) if !classes.contains(class) => {
            failures.push(
                Failure::new(format!(
                    "Ingress uses the ingress class {} which does not exist.",
                    class
                ))
                .with_doc(ctx.doc(docs::INGRESS_CLASS))
                .with_sensitive([class]),
            );
        }
        (None, None) => {
            failures.push(
                Failure::new(format!(
                    "Ingress {}/{} does not specify an Ingress class.",
                    namespace, name
                ))
                .with_doc(ctx.doc(docs::INGRESS_CLASS))
                .with_sensitive([namespace, name]),
            );
        }
        _ => {}
    }

    let backends = spec
        .and_then(|s| s.default_backend.as_ref())
        .into_iter()
        .chain(
            spec.and_then(|s| s.rules.as_ref())
                .into_iter()
                .flatten()
                .filter_map(|rule| rule.http.as_ref())
                .flat_map(|http| http.paths.iter().map(|p| &p.backend)),
        );
    let mut reported = HashSet::new();
    for service in backends.filter_map(|b: &IngressBackend| b.service.as_ref()) {
        let key = (namespace.to_string(), service.name.clone());
        if !services.contains(&key) && reported.insert(service.name.clone()) {
            failures.push(
                Failure::new(format!(
                    "Ingress uses the service {}/{} which does not exist.",
                    namespace, service.name
                ))
                .with_doc(ctx.doc(docs::INGRESS_BACKEND))
                .with_sensitive([namespace, service.name.as_str()]),
            );
        }
    }

    failures
}
