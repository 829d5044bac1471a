use futures_util::FutureExt;
use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::analyzer::{Analyzer, AnalyzerContext};
use crate::common::AnalysisResult;

/// Wall time of one analyzer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub analyzer: String,
    pub duration_ms: u64,
}

/// Everything collected from one batch of analyzers.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub results: Vec<AnalysisResult>,
    pub errors: Vec<String>,
    pub stats: Vec<AnalysisStats>,
}

/// Run `analyzers` with at most `max_concurrency` in flight.
///
/// A permit is taken before each spawn, so with a bound of one the analyzers
/// run strictly in order. Failures and panics become entries in `errors`.
/// Once `ctx.cancel` is set no further analyzer is started.
pub async fn execute(
    analyzers: &[Arc<dyn Analyzer>],
    ctx: &AnalyzerContext,
    max_concurrency: usize,
) -> ExecutionReport {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let report = Arc::new(Mutex::new(ExecutionReport::default()));
    let mut tasks = JoinSet::new();

    for analyzer in analyzers {
        if ctx.cancel.is_cancelled() {
            debug!("Run cancelled, not launching remaining analyzers");
            break;
        }
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        if ctx.cancel.is_cancelled() {
            break;
        }

        let analyzer = Arc::clone(analyzer);
        let ctx = ctx.clone();
        let report = Arc::clone(&report);
        let label = format!("{}Analyzer", analyzer.name());
        debug!("Debug: {} launched.", label);

        tasks.spawn(async move {
            let _permit = permit;
            let started = Instant::now();
            let outcome = AssertUnwindSafe(analyzer.analyze(&ctx)).catch_unwind().await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let mut report = report.lock();
            match outcome {
                Ok(Ok(results)) => {
                    debug!("Debug: {} completed without errors.", label);
                    report.results.extend(results);
                }
                Ok(Err(e)) => {
                    debug!("Debug: {} completed with errors: {}", label, e);
                    report.errors.push(format!("[{}] {}", label, e));
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    debug!("Debug: {} completed with errors: {}", label, message);
                    report.errors.push(format!("[{}] panicked: {}", label, message));
                }
            }
            report.stats.push(AnalysisStats {
                analyzer: analyzer.name().to_string(),
                duration_ms,
            });
        });
    }

    while tasks.join_next().await.is_some() {}

    match Arc::try_unwrap(report) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => std::mem::take(&mut *shared.lock()),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
