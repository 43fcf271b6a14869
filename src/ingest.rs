//! Per-target fetch results collected by the ingestion adapters.

use crate::analyzers::types::{Platform, RawRecord};
use crate::errors::FetchError;

/// Result of fetching one (sector, target) pair.
#[derive(Debug)]
pub struct FetchOutcome {
    pub sector: String,
    pub target: String,
    pub result: Result<Vec<RawRecord>, FetchError>,
}

/// Every outcome of one fetch run, in the order the targets were visited.
#[derive(Debug)]
pub struct FetchReport {
    pub platform: Platform,
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, sector: &str, target: &str, result: Result<Vec<RawRecord>, FetchError>) {
        self.outcomes.push(FetchOutcome {
            sector: sector.to_string(),
            target: target.to_string(),
            result,
        });
    }

    /// All records from successful targets, in visit order.
    pub fn records(&self) -> Vec<RawRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
            .cloned()
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FetchOutcome, &FetchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o, e)))
    }
}
