//! Masking of sensitive cluster data before it leaves the process.
//!
//! Every value is replaced by a placeholder derived from its hash, so the same
//! input always masks to the same text. Replacement is a single leftmost-longest
//! pass over the input, which keeps overlapping values from corrupting each
//! other's placeholders.

use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashSet;

use super::types::Sensitive;

pub const PLACEHOLDER_PREFIX: &str = "masked-";

#[derive(Debug, thiserror::Error)]
#[error("Failed to build masking matcher: {0}")]
pub struct MaskingError(#[from] aho_corasick::BuildError);

/// Text with every sensitive value replaced, plus the substitutions that were made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    pub substitutions: Vec<Sensitive>,
}

/// Deterministic placeholder for a sensitive value.
pub fn placeholder_for(value: &str) -> String {
    let hash = blake3::hash(value.as_bytes());
    format!("{}{}", PLACEHOLDER_PREFIX, &hash.to_hex()[..12])
}

/// Replaces every occurrence of each value in `text`.
///
/// Empty and duplicate values are ignored. Only values that actually occur are
/// recorded, in order of first occurrence.
pub fn sanitize<S: AsRef<str>>(text: &str, values: &[S]) -> Result<Sanitized, MaskingError> {
    let mut distinct: Vec<&str> = Vec::new();
    for value in values.iter().map(AsRef::as_ref) {
        if !value.is_empty() && !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    if distinct.is_empty() {
        return Ok(Sanitized {
            text: text.to_string(),
            substitutions: Vec::new(),
        });
    }

    let mut used = HashSet::new();
    let placeholders: Vec<String> = distinct
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mut placeholder = placeholder_for(value);
            if !used.insert(placeholder.clone()) {
                placeholder = format!("{}-{}", placeholder, i);
                used.insert(placeholder.clone());
            }
            placeholder
        })
        .collect();

    let matcher = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&distinct)?;

    let mut seen = Vec::new();
    for mat in matcher.find_iter(text) {
        let idx = mat.pattern().as_usize();
        if !seen.contains(&idx) {
            seen.push(idx);
        }
    }

    let substitutions = seen
        .into_iter()
        .map(|idx| Sensitive {
            masked: placeholders[idx].clone(),
            unmasked: distinct[idx].to_string(),
        })
        .collect();

    Ok(Sanitized {
        text: matcher.replace_all(text, &placeholders),
        substitutions,
    })
}

/// Inverse of [`sanitize`].
pub fn restore(text: &str, substitutions: &[Sensitive]) -> Result<String, MaskingError> {
    let pairs: Vec<&Sensitive> = substitutions
        .iter()
        .filter(|s| !s.masked.is_empty())
        .collect();
    if pairs.is_empty() {
        return Ok(text.to_string());
    }

    let matcher = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(pairs.iter().map(|s| s.masked.as_str()))?;
    let replacements: Vec<&str> = pairs.iter().map(|s| s.unmasked.as_str()).collect();

    Ok(matcher.replace_all(text, &replacements))
}
