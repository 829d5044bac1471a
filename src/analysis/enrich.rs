use base64::{Engine, engine::general_purpose::STANDARD};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};

use super::{Analysis, AnalysisError, OutputFormat};
use crate::ai::prompts;
use crate::cache::fingerprint;
use crate::common::{Sensitive, restore, sanitize};

fn progress_bar(len: usize, format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Text {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("  {spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message("Analyzing");
    pb
}

fn is_quota_error(message: &str) -> bool {
    message.contains("429")
}

impl Analysis {
    /// Attach an explanation to every result that has failures.
    ///
    /// Sensitive values never leave the process: the backend only sees the
    /// sanitized text. With `anonymize` the placeholders stay in `details`.
    pub async fn get_ai_results(
        &mut self,
        format: OutputFormat,
        anonymize: bool,
    ) -> Result<(), AnalysisError> {
        if self.results.is_empty() {
            return Ok(());
        }
        let provider = match &self.backend {
            Some(backend) => backend.name().to_string(),
            None => return Err(AnalysisError::NoBackend),
        };

        let bar = progress_bar(self.results.len(), format);
        let mut attempted = 0usize;
        let mut last_error: Option<String> = None;
        let mut succeeded = 0usize;

        for index in 0..self.results.len() {
            let result = &self.results[index];
            bar.set_message(format!("Analyzing {} {}", result.kind, result.name));
            if result.error.is_empty() {
                bar.inc(1);
                continue;
            }

            let joined = result
                .error
                .iter()
                .map(|f| f.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let values: Vec<&str> = result
                .error
                .iter()
                .flat_map(|f| f.sensitive.iter().map(|s| s.unmasked.as_str()))
                .collect();
            let sanitized = match sanitize(&joined, &values) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Skipping {} {}: {}", result.kind, result.name, e);
                    self.errors
                        .push(format!("[{}] {}: {}", result.kind, result.name, e));
                    bar.inc(1);
                    continue;
                }
            };
            let template = prompts::template_for(&result.kind);

            attempted += 1;
            let response = match self
                .get_ai_result_for_sanitized_failures(&[sanitized.text.clone()], template)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let message = e.to_string();
                    warn!("AI explanation failed for {}: {}", self.results[index].name, message);
                    self.errors.push(format!(
                        "[{}] {}: {}",
                        self.results[index].kind, self.results[index].name, message
                    ));
                    last_error = Some(message);
                    bar.inc(1);
                    continue;
                }
            };
            succeeded += 1;

            let details = if anonymize {
                response
            } else {
                restore(&response, &sanitized.substitutions).unwrap_or_else(|e| {
                    warn!("Could not restore masked values: {}", e);
                    response.clone()
                })
            };

            let result = &mut self.results[index];
            result.details = details;
            for failure in &mut result.error {
                apply_placeholders(&mut failure.sensitive, &sanitized.substitutions);
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        if attempted > 0 && succeeded == 0 {
            let message = last_error.unwrap_or_default();
            if is_quota_error(&message) {
                return Err(AnalysisError::QuotaExhausted { provider, message });
            }
            return Err(AnalysisError::Backend { provider, message });
        }
        self.explained_by = Some(provider);
        Ok(())
    }

    /// Explanation for already sanitized failure texts, served from the
    /// cache when possible. The returned text still carries placeholders.
    pub async fn get_ai_result_for_sanitized_failures(
        &self,
        texts: &[String],
        template: &str,
    ) -> Result<String, AnalysisError> {
        let backend = self.backend.as_ref().ok_or(AnalysisError::NoBackend)?;
        let text = texts.join(" ");
        // Keyed on the rendered prompt so different templates never share an answer.
        let prompt = prompts::render(template, &self.language, &text);
        let key = fingerprint(backend.name(), &self.language, &prompt);

        if let Some(cached) = self.cache.get(&key) {
            match STANDARD.decode(cached.as_bytes()) {
                Ok(bytes) => return Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => warn!("Ignoring undecodable cache entry {}: {}", key, e),
            }
        }

        debug!("Debug: Generating AI analysis.");
        let response = backend
            .complete(&prompt)
            .await
            .map_err(|e| AnalysisError::Backend {
                provider: backend.name().to_string(),
                message: e.to_string(),
            })?;

        if let Err(e) = self.cache.put(&key, &STANDARD.encode(response.as_bytes())) {
            warn!("Failed to cache AI response: {}", e);
        }
        Ok(response)
    }

    /// Provider that explained this run, if enrichment happened.
    pub fn explained_by(&self) -> Option<&str> {
        self.explained_by.as_deref()
    }
}

fn apply_placeholders(records: &mut [Sensitive], substitutions: &[Sensitive]) {
    for record in records {
        if let Some(used) = substitutions.iter().find(|s| s.unmasked == record.unmasked) {
            record.masked = used.masked.clone();
        }
    }
}
