use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use super::{Analyzer, AnalyzerContext, AnalyzerError};
use crate::common::AnalysisResult;
use crate::config::types::CustomAnalyzerConfig;

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    namespace: Option<&'a str>,
}

/// Analyzer that runs out of process and answers `POST /analyze`.
#[derive(Debug, Clone)]
pub struct HttpCustomAnalyzer {
    name: String,
    endpoint: String,
    http: reqwest::Client,
}

impl HttpCustomAnalyzer {
    pub fn new(name: impl Into<String>, url: &str, port: u16) -> Self {
        let host = url
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        Self {
            name: name.into(),
            endpoint: format!("http://{}:{}/analyze", host, port),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl From<&CustomAnalyzerConfig> for HttpCustomAnalyzer {
    fn from(config: &CustomAnalyzerConfig) -> Self {
        Self::new(&config.name, &config.url, config.port)
    }
}

#[async_trait]
impl Analyzer for HttpCustomAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        debug!("Calling custom analyzer {} at {}", self.name, self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&AnalyzeRequest {
                namespace: ctx.namespace(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::CustomStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result: AnalysisResult = response.json().await?;
        Ok(self.adopt(result))
    }
}

impl HttpCustomAnalyzer {
    /// Results are reported under the registered name, whatever kind the
    /// remote side claims. Results without failures are dropped.
    fn adopt(&self, mut result: AnalysisResult) -> Vec<AnalysisResult> {
        if !result.has_failures() {
            return Vec::new();
        }
        if result.kind != self.name {
            if !result.kind.is_empty() {
                debug!(
                    "Custom analyzer {} reported kind {}, using its registered name",
                    self.name, result.kind
                );
            }
            result.kind = self.name.clone();
        }
        vec![result]
    }
}
