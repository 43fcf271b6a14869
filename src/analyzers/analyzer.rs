use crate::analyzers::aggregate::{
    SectorMetric, aggregate_by_month, aggregate_by_sector, aggregate_by_topic, aggregate_by_week,
    ranked_sectors,
};
use crate::analyzers::preprocess::preprocess;
use crate::analyzers::report::{Report, build_report};
use crate::analyzers::types::{
    DerivedRecord, MonthBucket, Platform, RawRecord, SectorPerformance, TopicViews, TrendPoint,
    WeekBucket,
};
use crate::errors::ParseError;
use crate::output::{write_json, write_table};
use crate::parser::parse_records;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Calendar bucket used for trend tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrendBucket {
    #[default]
    Week,
    Month,
}

/// Immutable, preprocessed snapshot of one dataset.
///
/// Every query borrows the snapshot; nothing is cached or mutated between calls.
#[derive(Debug, Clone)]
pub struct Analysis {
    platform: Platform,
    records: Vec<DerivedRecord>,
}

impl Analysis {
    /// Preprocesses `records` with the platform's engagement-rate policy.
    pub fn from_raw(records: &[RawRecord], platform: Platform) -> Result<Self, ParseError> {
        let records = preprocess(records, platform.rate_policy())?;
        Ok(Self { platform, records })
    }

    pub fn records(&self) -> &[DerivedRecord] {
        &self.records
    }

    pub fn sector_performance(&self) -> Vec<SectorPerformance> {
        aggregate_by_sector(&self.records)
    }

    pub fn topic_performance(&self) -> TopicViews {
        aggregate_by_topic(&self.records)
    }

    pub fn weekly_trends(&self) -> Vec<TrendPoint<WeekBucket>> {
        aggregate_by_week(&self.records)
    }

    pub fn monthly_trends(&self) -> Vec<TrendPoint<MonthBucket>> {
        aggregate_by_month(&self.records)
    }

    pub fn report(&self) -> Report {
        build_report(&self.records, self.platform)
    }
}

/// Reads and decodes a dataset CSV from disk.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let bytes = fs::read(path).with_context(|| format!("reading dataset {}", path.display()))?;
    let records = parse_records(&bytes)?;
    debug!(path = %path.display(), rows = records.len(), "Dataset loaded");
    Ok(records)
}

/// Loads a dataset, runs every aggregation, and writes chart-ready tables
/// plus `report.json` into `output_dir`.
///
/// Returns the report so callers can print it.
#[tracing::instrument(skip_all, fields(input = %input.display(), platform = %platform))]
pub fn analyze(
    input: &Path,
    platform: Platform,
    output_dir: &Path,
    bucket: TrendBucket,
) -> Result<Report> {
    let raw = load_records(input)?;
    let analysis = Analysis::from_raw(&raw, platform)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let sectors = analysis.sector_performance();
    write_table(
        &output_dir.join("sector_performance.csv"),
        &ranked_sectors(&sectors, SectorMetric::Virality),
    )?;
    info!(sectors = sectors.len(), "Sector performance written");

    let topics = analysis.topic_performance();
    write_table(
        &output_dir.join("top_topics_by_virality.csv"),
        &topics.top_by_virality,
    )?;
    write_table(
        &output_dir.join("top_topics_by_engagement.csv"),
        &topics.top_by_engagement,
    )?;
    info!(topics = topics.topics.len(), "Topic rankings written");

    let trend_points = match bucket {
        TrendBucket::Week => {
            let trends = analysis.weekly_trends();
            write_table(&output_dir.join("weekly_trends.csv"), &trends)?;
            trends.len()
        }
        TrendBucket::Month => {
            let trends = analysis.monthly_trends();
            write_table(&output_dir.join("monthly_trends.csv"), &trends)?;
            trends.len()
        }
    };
    info!(?bucket, points = trend_points, "Trends written");

    let report = analysis.report();
    write_json(&output_dir.join("report.json"), &report)?;

    info!(
        rows = analysis.records().len(),
        output_dir = %output_dir.display(),
        "Analysis complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const DATASET: &str = "id,sector,sub_entity,topic,engagement,secondary_amplifier,timestamp,audience_size\n\
        a,tech,rust,Ownership...,10,5,2024-01-03T10:00:00Z,1000\n\
        b,tech,rust,Lifetimes...,20,0,2024-01-09T10:00:00Z,0\n\
        c,finance,investing,Index funds...,8,1,2024-02-01T10:00:00Z,400\n";

    fn write_dataset(name: &str) -> std::path::PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("data.csv");
        fs::write(&path, DATASET).unwrap();
        path
    }

    #[test]
    fn test_snapshot_queries() {
        let raw = parse_records(DATASET.as_bytes()).unwrap();
        let analysis = Analysis::from_raw(&raw, Platform::Reddit).unwrap();

        assert_eq!(analysis.records().len(), 3);
        let sectors = analysis.sector_performance();
        let tech = sectors.iter().find(|s| s.sector == "tech").unwrap();
        assert_eq!(tech.mean_virality, 20.0);
        assert_eq!(tech.mean_engagement_rate, Some(0.01));
        assert_eq!(analysis.weekly_trends().len(), 3);
        assert_eq!(analysis.monthly_trends().len(), 2);
    }

    #[test]
    fn test_analyze_writes_tables() {
        let input = write_dataset("social_trends_analyze_week");
        let out = input.parent().unwrap().join("reports");

        let report = analyze(&input, Platform::Reddit, &out, TrendBucket::Week).unwrap();
        assert_eq!(report.sectors.len(), 2);

        for name in [
            "sector_performance.csv",
            "top_topics_by_virality.csv",
            "top_topics_by_engagement.csv",
            "weekly_trends.csv",
            "report.json",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }
        assert!(!out.join("monthly_trends.csv").exists());

        let sectors = fs::read_to_string(out.join("sector_performance.csv")).unwrap();
        let first_row = sectors.lines().nth(1).unwrap();
        assert!(first_row.starts_with("tech,"));

        fs::remove_dir_all(input.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_analyze_month_bucket() {
        let input = write_dataset("social_trends_analyze_month");
        let out = input.parent().unwrap().join("reports");

        analyze(&input, Platform::Twitter, &out, TrendBucket::Month).unwrap();
        let trends = fs::read_to_string(out.join("monthly_trends.csv")).unwrap();
        assert!(trends.starts_with("bucket,sector,mean_virality"));
        assert!(trends.contains("2024-02,finance"));

        fs::remove_dir_all(input.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_analyze_rejects_bad_timestamp() {
        let dir = env::temp_dir().join("social_trends_analyze_bad");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("data.csv");
        fs::write(
            &input,
            "id,sector,sub_entity,topic,engagement,secondary_amplifier,timestamp,audience_size\n\
             x,tech,rust,T...,1,0,yesterday,\n",
        )
        .unwrap();

        let err = analyze(&input, Platform::Reddit, &dir.join("out"), TrendBucket::Week)
            .unwrap_err();
        assert!(err.to_string().contains("yesterday"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
