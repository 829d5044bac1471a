use serde::{Deserialize, Serialize};

use super::sensitive::placeholder_for;

/// Findings reported by one analyzer for one flagged object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub error: Vec<Failure>,
    /// AI explanation, empty until the result has been enriched.
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub parent_object: String,
}

impl AnalysisResult {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_object = parent.into();
        self
    }

    pub fn with_failures(mut self, failures: Vec<Failure>) -> Self {
        self.error = failures;
        self
    }

    pub fn has_failures(&self) -> bool {
        !self.error.is_empty()
    }
}

/// A single diagnostic finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub text: String,
    #[serde(default)]
    pub kubernetes_doc: String,
    #[serde(default)]
    pub sensitive: Vec<Sensitive>,
}

impl Failure {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.kubernetes_doc = doc.into();
        self
    }

    /// Records values that appear verbatim in the text and must not leave the process.
    pub fn with_sensitive<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive
            .extend(values.into_iter().map(|v| Sensitive::new(v.into())));
        self
    }
}

/// One masked/unmasked substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sensitive {
    pub masked: String,
    pub unmasked: String,
}

impl Sensitive {
    pub fn new(unmasked: String) -> Self {
        Self {
            masked: placeholder_for(&unmasked),
            unmasked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_serializes_with_camel_case_fields() {
        let result = AnalysisResult::new("Pod", "default/web")
            .with_parent("Deployment/web")
            .with_failures(vec![Failure::new("boom").with_doc("spec.containers")]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "Pod");
        assert_eq!(json["parentObject"], "Deployment/web");
        assert_eq!(json["error"][0]["kubernetesDoc"], "spec.containers");
        assert!(json["error"][0]["sensitive"].as_array().unwrap().is_empty());
        assert_eq!(json["details"], "");
    }

    #[test]
    fn test_sensitive_values_get_stable_placeholders() {
        let failure = Failure::new("label app=web").with_sensitive(["app", "web"]);
        assert_eq!(failure.sensitive.len(), 2);
        assert_eq!(failure.sensitive[0].unmasked, "app");
        assert_eq!(failure.sensitive[0].masked, placeholder_for("app"));
        assert_ne!(failure.sensitive[0].masked, failure.sensitive[1].masked);
    }
}
