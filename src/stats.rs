use crate::analyzers::types::Platform;
use crate::errors::FetchError;
use crate::ingest::FetchReport;

/// Counters summarising one fetch run.
#[derive(Debug)]
pub struct FetchStats {
    pub platform: Platform,
    pub targets: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: usize,

    // failures by kind
    pub transport_errors: usize,
    pub status_errors: usize,
    pub payload_errors: usize,
    pub auth_errors: usize,
}

impl FetchStats {
    pub fn from_report(report: &FetchReport) -> Self {
        let mut s = FetchStats {
            platform: report.platform,
            targets: report.outcomes.len(),
            succeeded: 0,
            failed: 0,
            records: 0,
            transport_errors: 0,
            status_errors: 0,
            payload_errors: 0,
            auth_errors: 0,
        };

        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(rows) => {
                    s.succeeded += 1;
                    s.records += rows.len();
                }
                Err(e) => {
                    s.failed += 1;
                    match e {
                        FetchError::Transport { .. } => s.transport_errors += 1,
                        FetchError::Status { .. } => s.status_errors += 1,
                        FetchError::Payload { .. } => s.payload_errors += 1,
                        FetchError::Auth(_) => s.auth_errors += 1,
                    }
                }
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn failure_pct(&self) -> f64 {
        Self::pct(self.failed, self.targets)
    }
}
