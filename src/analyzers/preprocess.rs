//! Per-record derivation: time buckets, virality and engagement rate.

use crate::analyzers::types::{
    DerivedRecord, EngagementRatePolicy, MonthBucket, RawRecord, WeekBucket,
};
use crate::errors::ParseError;
use crate::parser::parse_timestamp;
use std::collections::HashMap;

/// Derives time buckets, virality and engagement rate for a batch of records.
///
/// Output order matches input order. Under
/// [`EngagementRatePolicy::PerSectorCount`] the rate depends on the whole
/// batch, so the same record can get a different rate in a different batch.
///
/// # Errors
///
/// Fails on the first record whose timestamp does not parse; nothing is
/// silently dropped.
pub fn preprocess(
    records: &[RawRecord],
    policy: EngagementRatePolicy,
) -> Result<Vec<DerivedRecord>, ParseError> {
    let counts = match policy {
        EngagementRatePolicy::PerSectorCount => sector_counts(records),
        EngagementRatePolicy::PerAudience => HashMap::new(),
    };

    records
        .iter()
        .map(|record| -> Result<DerivedRecord, ParseError> {
            let date = parse_timestamp(record)?;
            let engagement_rate = match policy {
                EngagementRatePolicy::PerAudience => per_audience(record),
                EngagementRatePolicy::PerSectorCount => counts
                    .get(record.sector.as_str())
                    .map(|&n| record.engagement as f64 / n as f64),
            };

            Ok(DerivedRecord {
                record: record.clone(),
                date,
                week: WeekBucket::containing(date),
                month: MonthBucket::containing(date),
                virality: virality(record),
                engagement_rate,
            })
        })
        .collect()
}

/// `engagement + 2 * secondary_amplifier`.
pub fn virality(record: &RawRecord) -> u64 {
    record
        .engagement
        .saturating_add(record.secondary_amplifier.saturating_mul(2))
}

// Zero and missing audiences both leave the rate undefined.
fn per_audience(record: &RawRecord) -> Option<f64> {
    match record.audience_size {
        Some(audience) if audience > 0 => Some(record.engagement as f64 / audience as f64),
        _ => None,
    }
}

fn sector_counts(records: &[RawRecord]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.sector.as_str()).or_insert(0) += 1;
    }
    counts
}
