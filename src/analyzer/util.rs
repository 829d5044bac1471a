use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;

pub fn namespace_of(meta: &ObjectMeta) -> &str {
    meta.namespace.as_deref().unwrap_or("default")
}

pub fn name_of(meta: &ObjectMeta) -> &str {
    meta.name.as_deref().unwrap_or_default()
}

/// `namespace/name`, or just `name` for cluster-scoped objects.
pub fn qualified_name(meta: &ObjectMeta) -> String {
    match meta.namespace.as_deref() {
        Some(ns) => format!("{}/{}", ns, name_of(meta)),
        None => name_of(meta).to_string(),
    }
}

/// The controlling owner, falling back to the first owner reference.
pub fn owner_of(meta: &ObjectMeta) -> Option<&OwnerReference> {
    let refs = meta.owner_references.as_ref()?;
    refs.iter()
        .find(|r| r.controller.unwrap_or(false))
        .or_else(|| refs.first())
}

/// `app=web,tier=frontend`
pub fn labels_to_string(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Keys and values of a label map, for masking.
pub fn label_values(labels: &BTreeMap<String, String>) -> Vec<String> {
    labels
        .iter()
        .flat_map(|(k, v)| [k.clone(), v.clone()])
        .collect()
}

/// Equality-based selector match.
pub fn selector_matches(
    selector: &BTreeMap<String, String>,
    labels: Option<&BTreeMap<String, String>>,
) -> bool {
    let Some(labels) = labels else {
        return selector.is_empty();
    };
    selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}
