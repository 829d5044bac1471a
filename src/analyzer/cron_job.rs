use async_trait::async_trait;

use super::util::{name_of, qualified_name};
use super::{Analyzer, AnalyzerContext, AnalyzerError, docs};
use crate::common::{AnalysisResult, Failure};

const SCHEDULE_MACROS: &[&str] = &[
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

/// Flags suspended cron jobs and malformed schedules.
pub struct CronJobAnalyzer;

#[async_trait]
impl Analyzer for CronJobAnalyzer {
    fn name(&self) -> &str {
        "CronJob"
    }

    async fn analyze(&self, ctx: &AnalyzerContext) -> Result<Vec<AnalysisResult>, AnalyzerError> {
        let cron_jobs = ctx.client.list_cron_jobs(ctx.namespace()).await?;
        let mut results = Vec::new();

        for job in &cron_jobs {
            let Some(spec) = &job.spec else { continue };
            let name = name_of(&job.metadata);
            let mut failures = Vec::new();

            if spec.suspend.unwrap_or(false) {
                failures.push(
                    Failure::new(format!("CronJob {} is suspended", name))
                        .with_doc(ctx.doc(docs::CRON_JOB_SUSPEND))
                        .with_sensitive([name]),
                );
            } else if !is_valid_schedule(&spec.schedule) {
                failures.push(
                    Failure::new(format!(
                        "CronJob {} has an invalid schedule: {}",
                        name, spec.schedule
                    ))
                    .with_doc(ctx.doc(docs::CRON_JOB_SCHEDULE))
                    .with_sensitive([name]),
                );
            }

            if spec.starting_deadline_seconds.is_some_and(|s| s < 0) {
                failures.push(
                    Failure::new(format!(
                        "CronJob {} has a negative starting deadline",
                        name
                    ))
                    .with_sensitive([name]),
                );
            }

            if !failures.is_empty() {
                results.push(
                    AnalysisResult::new(self.name(), qualified_name(&job.metadata))
                        .with_failures(failures),
                );
            }
        }
        Ok(results)
    }
}

/// Five whitespace separated cron fields, a `TZ=` prefix, or a macro.
fn is_valid_schedule(schedule: &str) -> bool {
    let schedule = schedule.trim();
    let schedule = match schedule.split_once(' ') {
        Some((tz, rest)) if tz.starts_with("TZ=") || tz.starts_with("CRON_TZ=") => rest.trim(),
        _ => schedule,
    };
    if SCHEDULE_MACROS.contains(&schedule) {
        return true;
    }
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    fields.len() == 5
        && fields.iter().all(|f| {
            f.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | '/' | ',' | '-' | '?'))
        })
}
