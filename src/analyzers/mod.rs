//! Metrics and aggregation over fetched posts.
//!
//! This module derives time buckets, virality and engagement rate for each
//! record, groups the snapshot by sector, topic, week and sub-entity, and
//! renders the summary report consumed by the charting layer.

pub mod aggregate;
pub mod analyzer;
pub mod preprocess;
pub mod report;
pub mod types;
pub mod utility;
