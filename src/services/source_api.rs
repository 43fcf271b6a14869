//! Trait for platform post sources and the sequential fetch loop over them.

use social_trends::analyzers::types::{Platform, RawRecord};
use social_trends::config::TargetConfig;
use social_trends::errors::FetchError;
use social_trends::ingest::FetchReport;
use social_trends::output::write_records;
use social_trends::stats::FetchStats;
use std::path::Path;
use tracing::{Instrument, error, info, warn};

/// Abstraction over a platform API that yields posts for one search target.
#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetches the posts for `target` (a subreddit, or a search query) and
    /// labels them with `sector`.
    async fn fetch_target(
        &self,
        sector: &str,
        target: &str,
    ) -> Result<Vec<RawRecord>, FetchError>;
}

/// Visits every (sector, target) pair in order, one request at a time.
///
/// A failing target is logged and recorded in the report; the remaining
/// targets are still fetched.
pub async fn collect<S: PostSource + ?Sized>(source: &S, targets: &TargetConfig) -> FetchReport {
    let mut report = FetchReport::new(source.platform());

    for (sector, target) in targets.iter() {
        let span = tracing::info_span!("fetch_target", sector = %sector, target = %target);

        let result = async {
            let result = source.fetch_target(sector, target).await;
            match &result {
                Ok(rows) => info!(rows = rows.len(), "Target fetched"),
                Err(e) => error!(error = %e, error_type = e.kind(), "Target fetch failed"),
            }
            result
        }
        .instrument(span)
        .await;

        report.push(sector, target, result);
    }

    report
}

/// Fetches every target, then writes the successful records to `output`.
///
/// If every target failed, `output` is left untouched so the previous
/// snapshot survives.
#[tracing::instrument(skip_all, fields(platform = %source.platform(), output = %output.display()))]
pub async fn fetch_to_file<S: PostSource + ?Sized>(
    source: &S,
    targets: &TargetConfig,
    output: &Path,
) -> anyhow::Result<FetchStats> {
    let report = collect(source, targets).await;

    for (outcome, error) in report.failures() {
        warn!(
            sector = %outcome.sector,
            target = %outcome.target,
            error_type = error.kind(),
            "Target skipped"
        );
    }

    let stats = FetchStats::from_report(&report);
    info!(
        targets = stats.targets,
        succeeded = stats.succeeded,
        failed = stats.failed,
        failure_pct = stats.failure_pct(),
        records = stats.records,
        transport_errors = stats.transport_errors,
        status_errors = stats.status_errors,
        payload_errors = stats.payload_errors,
        auth_errors = stats.auth_errors,
        "Fetch summary"
    );

    if stats.targets > 0 && stats.succeeded == 0 {
        anyhow::bail!("every target failed; {} not written", output.display());
    }

    write_records(output, &report.records())?;
    Ok(stats)
}
