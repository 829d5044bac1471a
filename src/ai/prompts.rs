//! Prompt templates. `{language}` and `{text}` are substituted at render time.

pub const DEFAULT_PROMPT: &str = r#"Simplify the following Kubernetes error message delimited by triple dashes written in --- {language} --- language; --- {text} ---.
Provide the most possible solution in a step by step style in no more than 280 characters. Write the output in the following format:
Error: {Explain error here}
Solution: {Step by step solution here}
"#;

const SECURITY_PROMPT: &str = r#"Provide a concise explanation of the following Kubernetes policy finding delimited by triple dashes written in --- {language} --- language; --- {text} ---.
Explain why it matters and how to remediate it in no more than 280 characters. Write the output in the following format:
Finding: {Explain finding here}
Remediation: {Remediation steps here}
"#;

/// Template for a result kind, falling back to [`DEFAULT_PROMPT`].
pub fn template_for(kind: &str) -> &'static str {
    match kind {
        "NetworkPolicy" | "PodDisruptionBudget" => SECURITY_PROMPT,
        _ => DEFAULT_PROMPT,
    }
}

/// Substitute the language and the sanitized failure text.
pub fn render(template: &str, language: &str, text: &str) -> String {
    template
        .replace("{language}", language)
        .replace("{text}", text)
}
