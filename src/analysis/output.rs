use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use super::{Analysis, AnalysisError, AnalysisStats};
use crate::common::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("unknown output format '{}', expected text, json or yaml", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    ProblemDetected,
}

/// Machine readable form of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub status: Status,
    pub problems: usize,
    pub results: Vec<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<AnalysisStats>,
}

impl Analysis {
    pub fn to_json_output(&self) -> JsonOutput {
        let problems = self.problems();
        JsonOutput {
            provider: self.explained_by().unwrap_or_default().to_string(),
            errors: self.errors.clone(),
            status: if problems > 0 {
                Status::ProblemDetected
            } else {
                Status::Ok
            },
            problems,
            results: self.results.clone(),
            stats: if self.with_stats {
                self.stats.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Render the run in the requested format.
    pub fn print_output(&self, format: OutputFormat) -> Result<Vec<u8>, AnalysisError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_vec_pretty(&self.to_json_output())?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&self.to_json_output())?.into_bytes()),
            OutputFormat::Text => Ok(self.text_output().into_bytes()),
        }
    }

    fn text_output(&self) -> String {
        let mut out = String::new();

        if let Some(provider) = self.explained_by() {
            let _ = writeln!(out, "AI Provider: {}", provider.yellow());
            out.push('\n');
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out, "{}", "Errors:".red().bold());
            for error in &self.errors {
                let _ = writeln!(out, "- {}", error.red());
            }
            out.push('\n');
        }

        if self.results.is_empty() {
            let _ = writeln!(out, "{}", "No problems detected".green());
        }

        for (i, result) in self.results.iter().enumerate() {
            let parent = if result.parent_object.is_empty() {
                String::new()
            } else {
                format!("({})", result.parent_object)
            };
            let _ = writeln!(
                out,
                "{}: {} {}{}",
                i.to_string().cyan(),
                result.kind.yellow(),
                result.name.cyan(),
                parent.cyan()
            );
            for failure in &result.error {
                let _ = writeln!(out, "- {} {}", "Error:".red(), failure.text.red());
                if !failure.kubernetes_doc.is_empty() {
                    let _ = writeln!(
                        out,
                        "  {} {}",
                        "Kubernetes Doc:".red(),
                        failure.kubernetes_doc.red()
                    );
                }
            }
            if !result.details.is_empty() {
                let _ = writeln!(out, "{}", result.details.green());
            }
        }

        if self.with_stats && !self.stats.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "{}", "Statistics:".bold());
            for stat in &self.stats {
                let _ = writeln!(out, "- {}: {}ms", stat.analyzer, stat.duration_ms);
            }
        }
        out
    }
}
