use async_trait::async_trait;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};

use super::util::{name_of, namespace_of, owner_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

const WAITING_ERROR_REASONS: &[&str] = &[
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
    "InvalidImageName",
    "CreateContainerConfigError",
    "CreateContainerError",
    "RunContainerError",
];

/// Flags unschedulable pods and containers stuck in an error state.
pub struct PodAnalyzer;

#[async_trait]
impl Analyzer for PodAnalyzer {
    fn name(&self) -> &str {
        "Pod"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let pods = ctx.client.list_pods(ctx.namespace()).await?;
        let mut replica_sets: Option<Vec<ReplicaSet>> = None;
        let mut results = Vec::new();

        for pod in &pods {
            let failures = pod_failures(pod, ctx);
            if failures.is_empty() {
                continue;
            }

            let mut parent = String::new();
            if let Some(owner) = owner_of(&pod.metadata) {
                parent = format!("{}/{}", owner.kind, owner.name);
                if owner.kind == "ReplicaSet" {
                    if replica_sets.is_none() {
                        replica_sets = Some(
                            ctx.client
                                .list_replica_sets(Some(namespace_of(&pod.metadata)))
                                .await?,
                        );
                    }
                    let deployment = replica_sets.iter().flatten().find_map(|rs| {
                        if name_of(&rs.metadata) != owner.name {
                            return None;
                        }
                        owner_of(&rs.metadata).filter(|o| o.kind == "Deployment")
                    });
                    if let Some(deployment) = deployment {
                        parent = format!("Deployment/{}", deployment.name);
                    }
                }
            }

            results.push(
                AnalysisResult::new(self.name(), qualified_name(&pod.metadata))
                    .with_parent(parent)
                    .with_failures(failures),
            );
        }

        Ok(results)
    }
}

fn pod_failures(pod: &Pod, ctx: &AnalyzerContext) -> Vec<Failure> {
    let Some(status) = &pod.status else {
        return Vec::new();
    };
    let mut failures = Vec::new();

    if status.phase.as_deref() == Some("Pending") {
        for condition in status.conditions.iter().flatten() {
            if condition.type_ == "PodScheduled"
                && condition.reason.as_deref() == Some("Unschedulable")
            {
                if let Some(message) = condition.message.as_deref().filter(|m| !m.is_empty()) {
                    failures.push(Failure::new(message).with_doc(ctx.doc(docs::POD_SCHEDULING)));
                }
            }
        }
    }

    let statuses = status
        .init_container_statuses
        .iter()
        .flatten()
        .chain(status.container_statuses.iter().flatten());
    for container in statuses {
        if let Some(failure) = container_failure(container, name_of(&pod.metadata)) {
            failures.push(failure.with_doc(ctx.doc(docs::POD_CONTAINER_STATE)));
        }
    }

    failures
}

fn container_failure(container: &ContainerStatus, pod_name: &str) -> Option<Failure> {
    let waiting = container.state.as_ref()?.waiting.as_ref()?;
    let reason = waiting.reason.as_deref()?;
    if !WAITING_ERROR_REASONS.contains(&reason) {
        return None;
    }

    if reason == "CrashLoopBackOff" {
        let terminated = container
            .last_state
            .as_ref()
            .and_then(|s| s.terminated.as_ref());
        if let Some(terminated) = terminated {
            let last_reason = terminated.reason.as_deref().unwrap_or("Unknown");
            return Some(
                Failure::new(format!(
                    "the last termination reason is {} container={} pod={}",
                    last_reason, container.name, pod_name
                ))
                .with_sensitive([pod_name]),
            );
        }
    }

    let text = match waiting.message.as_deref().filter(|m| !m.is_empty()) {
        Some(message) => message.to_string(),
        None => format!("Container {} is waiting: {}", container.name, reason),
    };
    Some(Failure::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::InMemoryCluster;
    use k8s_openapi::api::core::v1::{
        ContainerState, ContainerStateTerminated, ContainerStateWaiting, PodCondition, PodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use kube::api::ObjectMeta;
    use std::sync::Arc;

    fn meta(name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.into()),
            namespace: Some("default".into()),
            ..Default::default()
        }
    }

    fn owned_by(kind: &str, name: &str) -> Option<Vec<OwnerReference>> {
        Some(vec![OwnerReference {
            kind: kind.into(),
            name: name.into(),
            controller: Some(true),
            ..Default::default()
        }])
    }

    fn unschedulable_pod(name: &str) -> Pod {
        Pod {
            metadata: meta(name),
            status: Some(PodStatus {
                phase: Some("Pending".into()),
                conditions: Some(vec![PodCondition {
                    type_: "PodScheduled".into(),
                    reason: Some("Unschedulable".into()),
                    message: Some("0/1 nodes are available".into()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn crashing_pod(name: &str) -> Pod {
        Pod {
            metadata: meta(name),
            status: Some(PodStatus {
                phase: Some("Running".into()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "app".into(),
                    state: Some(ContainerState {
                        waiting: Some(ContainerStateWaiting {
                            reason: Some("CrashLoopBackOff".into()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    last_state: Some(ContainerState {
                        terminated: Some(ContainerStateTerminated {
                            exit_code: 1,
                            reason: Some("Error".into()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn ctx(cluster: InMemoryCluster) -> AnalyzerContext {
        AnalyzerContext::new(Arc::new(cluster), Some("default".into()))
    }

    #[tokio::test]
    async fn test_unschedulable_pod_is_flagged() {
        let results = PodAnalyzer
            .analyze(&ctx(InMemoryCluster::new().with(unschedulable_pod("example"))))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, "Pod");
        assert_eq!(results[0].name, "default/example");
        assert_eq!(results[0].error[0].text, "0/1 nodes are available");
        assert!(results[0].error[0].kubernetes_doc.is_empty());
    }

    #[tokio::test]
    async fn test_crash_loop_reports_last_termination_reason() {
        let results = PodAnalyzer
            .analyze(&ctx(InMemoryCluster::new().with(crashing_pod("api"))))
            .await
            .unwrap();

        let failure = &results[0].error[0];
        assert_eq!(
            failure.text,
            "the last termination reason is Error container=app pod=api"
        );
        assert_eq!(failure.sensitive[0].unmasked, "api");
    }

    #[tokio::test]
    async fn test_healthy_pod_is_not_reported() {
        let pod = Pod {
            metadata: meta("ok"),
            status: Some(PodStatus {
                phase: Some("Running".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let results = PodAnalyzer
            .analyze(&ctx(InMemoryCluster::new().with(pod)))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_parent_resolves_through_replica_set() {
        let mut pod = unschedulable_pod("web-abc-123");
        pod.metadata.owner_references = owned_by("ReplicaSet", "web-abc");
        let rs = ReplicaSet {
            metadata: ObjectMeta {
                owner_references: owned_by("Deployment", "web"),
                ..meta("web-abc")
            },
            ..Default::default()
        };

        let results = PodAnalyzer
            .analyze(&ctx(InMemoryCluster::new().with(pod).with(rs)))
            .await
            .unwrap();
        assert_eq!(results[0].parent_object, "Deployment/web");
    }

    #[tokio::test]
    async fn test_docs_attached_when_requested() {
        let mut ctx = ctx(InMemoryCluster::new().with(unschedulable_pod("example")));
        ctx.with_doc = true;
        let results = PodAnalyzer.analyze(&ctx).await.unwrap();
        assert_eq!(results[0].error[0].kubernetes_doc, docs::POD_SCHEDULING);
    }
}
