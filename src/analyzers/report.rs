//! Text report over a preprocessed snapshot.

use crate::analyzers::aggregate::{aggregate_by_sub_entity, sector_summaries};
use crate::analyzers::types::{
    DerivedRecord, Platform, SectorSummary, SubEntityPerformance, Summary,
};
use crate::analyzers::utility::round2;
use serde::Serialize;
use std::fmt;

/// Number of sub-entities listed per sector.
pub const TOP_SUB_ENTITIES: usize = 2;

/// Best sub-entities of one sector, by mean virality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorLeaders {
    pub sector: String,
    pub leaders: Vec<SubEntityPerformance>,
}

/// Structured performance report. `Display` renders it as console text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub platform: Platform,
    pub sectors: Vec<SectorSummary>,
    pub top_sub_entities: Vec<SectorLeaders>,
}

/// Builds the per-sector summary and the top sub-entities of every sector.
pub fn build_report(records: &[DerivedRecord], platform: Platform) -> Report {
    let mut top_sub_entities: Vec<SectorLeaders> = Vec::new();

    // rows arrive grouped by sector, best first
    for row in aggregate_by_sub_entity(records) {
        if let Some(group) = top_sub_entities
            .last_mut()
            .filter(|g| g.sector == row.sector)
        {
            if group.leaders.len() < TOP_SUB_ENTITIES {
                group.leaders.push(row);
            }
            continue;
        }
        top_sub_entities.push(SectorLeaders {
            sector: row.sector.clone(),
            leaders: vec![row],
        });
    }

    Report {
        platform,
        sectors: sector_summaries(records),
        top_sub_entities,
    }
}

fn fmt_std(std: Option<f64>) -> String {
    match std {
        Some(v) => format!("{:.2}", round2(v)),
        None => "NaN".to_string(),
    }
}

fn fmt_summary(summary: &Summary) -> String {
    format!(
        "{:>10.2} {:>10.2} {:>10}",
        round2(summary.mean),
        round2(summary.median),
        fmt_std(summary.std)
    )
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} Performance Analysis ===", self.platform)?;
        writeln!(f)?;

        writeln!(f, "Sector Performance Summary:")?;
        let width = self
            .sectors
            .iter()
            .map(|s| s.sector.chars().count())
            .max()
            .unwrap_or(0)
            .max("sector".len());
        writeln!(
            f,
            "{:<width$} {:^32} {:^32} {:>6}",
            "", "virality", "engagement", ""
        )?;
        writeln!(
            f,
            "{:<width$} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>6}",
            "sector", "mean", "median", "std", "mean", "median", "std", "count"
        )?;
        for sector in &self.sectors {
            writeln!(
                f,
                "{:<width$} {} {} {:>6}",
                sector.sector,
                fmt_summary(&sector.virality),
                fmt_summary(&sector.engagement),
                sector.count
            )?;
        }
        writeln!(f)?;
        writeln!(f)?;

        writeln!(
            f,
            "Top Performing {} by Sector:",
            self.platform.sub_entity_label()
        )?;
        for group in &self.top_sub_entities {
            writeln!(f)?;
            writeln!(f, "{}:", group.sector)?;
            for leader in &group.leaders {
                writeln!(
                    f,
                    "  {:<24} virality {:>10.2}  engagement {:>10.2}",
                    leader.sub_entity,
                    round2(leader.mean_virality),
                    round2(leader.mean_engagement)
                )?;
            }
        }

        writeln!(f)?;
        write!(f, "=== Analysis Complete ===")
    }
}
