//! Grouped summaries over a preprocessed snapshot: sectors, topics,
//! calendar trends and sub-entities.

use crate::analyzers::types::{
    DerivedRecord, MonthBucket, SectorPerformance, SectorSummary, SubEntityPerformance,
    TopicPerformance, TopicViews, TrendPoint, WeekBucket,
};
use crate::analyzers::utility::{mean, mean_of_defined, summarize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Length of the ranked topic views.
pub const TOP_TOPICS: usize = 10;

/// Metric a sector table can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorMetric {
    Virality,
    Engagement,
    EngagementRate,
}

/// Groups records by `key`, emitting groups in ascending key order.
fn group_by<'a, K, F>(records: &'a [DerivedRecord], key: F) -> BTreeMap<K, Vec<&'a DerivedRecord>>
where
    K: Ord,
    F: Fn(&'a DerivedRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a DerivedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

fn virality_series(rows: &[&DerivedRecord]) -> Vec<f64> {
    rows.iter().map(|r| r.virality as f64).collect()
}

fn engagement_series(rows: &[&DerivedRecord]) -> Vec<f64> {
    rows.iter().map(|r| r.record.engagement as f64).collect()
}

/// Stable descending sort: rows with equal metrics keep their relative order.
fn sort_desc<T, F>(rows: &mut [T], metric: F)
where
    F: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
}

/// Mean virality, engagement and engagement rate per sector, in sector order.
///
/// Rows with an undefined engagement rate still count towards the virality
/// and engagement means but are left out of the rate mean.
pub fn aggregate_by_sector(records: &[DerivedRecord]) -> Vec<SectorPerformance> {
    group_by(records, |r| r.record.sector.as_str())
        .into_iter()
        .map(|(sector, rows)| SectorPerformance {
            sector: sector.to_string(),
            mean_virality: mean(&virality_series(&rows)),
            mean_engagement: mean(&engagement_series(&rows)),
            mean_engagement_rate: mean_of_defined(rows.iter().map(|r| r.engagement_rate)),
            count: rows.len(),
        })
        .collect()
}

/// Returns the sector table sorted descending by `metric`.
///
/// Sectors with no defined engagement rate sort last when ranking by rate.
pub fn ranked_sectors(rows: &[SectorPerformance], metric: SectorMetric) -> Vec<SectorPerformance> {
    let mut ranked = rows.to_vec();
    match metric {
        SectorMetric::Virality => sort_desc(&mut ranked, |r| r.mean_virality),
        SectorMetric::Engagement => sort_desc(&mut ranked, |r| r.mean_engagement),
        SectorMetric::EngagementRate => {
            ranked.sort_by(|a, b| match (a.mean_engagement_rate, b.mean_engagement_rate) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        }
    }
    ranked
}

/// Mean virality and engagement per (sector, topic), plus the top
/// [`TOP_TOPICS`] by each metric.
pub fn aggregate_by_topic(records: &[DerivedRecord]) -> TopicViews {
    let topics: Vec<TopicPerformance> = group_by(records, |r| {
        (r.record.sector.as_str(), r.record.topic.as_str())
    })
    .into_iter()
    .map(|((sector, topic), rows)| TopicPerformance {
        sector: sector.to_string(),
        topic: topic.to_string(),
        mean_virality: mean(&virality_series(&rows)),
        mean_engagement: mean(&engagement_series(&rows)),
        count: rows.len(),
    })
    .collect();

    let mut top_by_virality = topics.clone();
    sort_desc(&mut top_by_virality, |t| t.mean_virality);
    top_by_virality.truncate(TOP_TOPICS);

    let mut top_by_engagement = topics.clone();
    sort_desc(&mut top_by_engagement, |t| t.mean_engagement);
    top_by_engagement.truncate(TOP_TOPICS);

    TopicViews {
        topics,
        top_by_virality,
        top_by_engagement,
    }
}

fn trend_by<'a, B, F>(records: &'a [DerivedRecord], bucket: F) -> Vec<TrendPoint<B>>
where
    B: Ord,
    F: Fn(&'a DerivedRecord) -> B,
{
    group_by(records, |r| (bucket(r), r.record.sector.as_str()))
        .into_iter()
        .map(|((bucket, sector), rows)| TrendPoint {
            bucket,
            sector: sector.to_string(),
            mean_virality: mean(&virality_series(&rows)),
            mean_engagement: mean(&engagement_series(&rows)),
            count: rows.len(),
        })
        .collect()
}

/// Mean virality and engagement per (week, sector), chronological then by sector.
pub fn aggregate_by_week(records: &[DerivedRecord]) -> Vec<TrendPoint<WeekBucket>> {
    trend_by(records, |r| r.week)
}

/// Month-bucketed variant of [`aggregate_by_week`].
pub fn aggregate_by_month(records: &[DerivedRecord]) -> Vec<TrendPoint<MonthBucket>> {
    trend_by(records, |r| r.month)
}

/// Mean, median and standard deviation of virality and engagement per sector.
pub fn sector_summaries(records: &[DerivedRecord]) -> Vec<SectorSummary> {
    group_by(records, |r| r.record.sector.as_str())
        .into_iter()
        .map(|(sector, rows)| SectorSummary {
            sector: sector.to_string(),
            virality: summarize(&virality_series(&rows)),
            engagement: summarize(&engagement_series(&rows)),
            count: rows.len(),
        })
        .collect()
}

/// Mean virality and engagement per (sector, sub-entity), sorted by sector
/// ascending, then mean virality descending.
pub fn aggregate_by_sub_entity(records: &[DerivedRecord]) -> Vec<SubEntityPerformance> {
    let mut rows: Vec<SubEntityPerformance> = group_by(records, |r| {
        (r.record.sector.as_str(), r.record.sub_entity.as_str())
    })
    .into_iter()
    .map(|((sector, sub_entity), rows)| SubEntityPerformance {
        sector: sector.to_string(),
        sub_entity: sub_entity.to_string(),
        mean_virality: mean(&virality_series(&rows)),
        mean_engagement: mean(&engagement_series(&rows)),
        count: rows.len(),
    })
    .collect();

    rows.sort_by(|a, b| {
        a.sector
            .cmp(&b.sector)
            .then_with(|| b.mean_virality.total_cmp(&a.mean_virality))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::preprocess::preprocess;
    use crate::analyzers::types::{EngagementRatePolicy, RawRecord};

    fn raw(id: &str, sector: &str, topic: &str, engagement: u64, amplifier: u64) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            sector: sector.to_string(),
            sub_entity: format!("{sector}_sub"),
            topic: topic.to_string(),
            engagement,
            secondary_amplifier: amplifier,
            timestamp: "2024-01-03T10:00:00Z".to_string(),
            audience_size: Some(100),
        }
    }

    fn derive(rows: &[RawRecord]) -> Vec<DerivedRecord> {
        preprocess(rows, EngagementRatePolicy::PerAudience).unwrap()
    }

    #[test]
    fn test_sector_mean_virality() {
        let records = derive(&[raw("a", "tech", "x", 10, 5), raw("b", "tech", "y", 20, 0)]);
        let sectors = aggregate_by_sector(&records);
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].mean_virality, 20.0);
        assert_eq!(sectors[0].mean_engagement, 15.0);
        assert_eq!(sectors[0].count, 2);
    }

    #[test]
    fn test_one_row_per_distinct_sector() {
        let records = derive(&[
            raw("a", "tech", "x", 1, 0),
            raw("b", "finance", "x", 1, 0),
            raw("c", "tech", "y", 1, 0),
            raw("d", "health", "z", 1, 0),
        ]);
        let sectors: Vec<String> = aggregate_by_sector(&records)
            .into_iter()
            .map(|s| s.sector)
            .collect();
        assert_eq!(sectors, vec!["finance", "health", "tech"]);
    }

    #[test]
    fn test_zero_audience_excluded_from_rate_only() {
        let mut zero = raw("b", "tech", "y", 30, 0);
        zero.audience_size = Some(0);
        let records = derive(&[raw("a", "tech", "x", 10, 0), zero]);

        let sector = &aggregate_by_sector(&records)[0];
        assert_eq!(sector.mean_engagement_rate, Some(0.1));
        assert_eq!(sector.mean_engagement, 20.0);
        assert_eq!(sector.mean_virality, 20.0);
    }

    #[test]
    fn test_sector_rate_undefined_when_no_audience() {
        let mut only = raw("a", "tech", "x", 10, 0);
        only.audience_size = None;
        let sector = &aggregate_by_sector(&derive(&[only]))[0];
        assert_eq!(sector.mean_engagement_rate, None);
    }

    #[test]
    fn test_ranked_sectors_stable_and_undefined_last() {
        let rows = vec![
            SectorPerformance {
                sector: "a".into(),
                mean_virality: 5.0,
                mean_engagement: 1.0,
                mean_engagement_rate: None,
                count: 1,
            },
            SectorPerformance {
                sector: "b".into(),
                mean_virality: 9.0,
                mean_engagement: 1.0,
                mean_engagement_rate: Some(0.2),
                count: 1,
            },
            SectorPerformance {
                sector: "c".into(),
                mean_virality: 5.0,
                mean_engagement: 3.0,
                mean_engagement_rate: Some(0.4),
                count: 1,
            },
        ];

        let by_virality: Vec<_> = ranked_sectors(&rows, SectorMetric::Virality)
            .into_iter()
            .map(|r| r.sector)
            .collect();
        assert_eq!(by_virality, vec!["b", "a", "c"]);

        let by_rate: Vec<_> = ranked_sectors(&rows, SectorMetric::EngagementRate)
            .into_iter()
            .map(|r| r.sector)
            .collect();
        assert_eq!(by_rate, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_top_topics_bounded_and_sorted() {
        let rows: Vec<RawRecord> = (0..15)
            .map(|i| raw(&format!("p{i}"), "tech", &format!("topic {i:02}"), i, 0))
            .collect();
        let views = aggregate_by_topic(&derive(&rows));

        assert_eq!(views.topics.len(), 15);
        assert_eq!(views.top_by_virality.len(), TOP_TOPICS);
        assert_eq!(views.top_by_virality[0].topic, "topic 14");
        assert!(
            views
                .top_by_virality
                .windows(2)
                .all(|w| w[0].mean_virality >= w[1].mean_virality)
        );
        assert!(
            views
                .top_by_virality
                .iter()
                .all(|t| views.topics.contains(t))
        );
    }

    #[test]
    fn test_top_topics_short_input_and_ties() {
        let rows = vec![
            raw("a", "tech", "beta", 5, 0),
            raw("b", "finance", "alpha", 5, 0),
            raw("c", "finance", "gamma", 7, 0),
        ];
        let views = aggregate_by_topic(&derive(&rows));
        let order: Vec<_> = views
            .top_by_engagement
            .iter()
            .map(|t| (t.sector.as_str(), t.topic.as_str()))
            .collect();
        // ties keep (sector, topic) emission order
        assert_eq!(
            order,
            vec![("finance", "gamma"), ("finance", "alpha"), ("tech", "beta")]
        );
    }

    #[test]
    fn test_duplicate_rows_keep_shared_mean() {
        let rows = vec![raw("a", "tech", "x", 8, 1), raw("b", "tech", "x", 8, 1)];
        let views = aggregate_by_topic(&derive(&rows));
        assert_eq!(views.topics.len(), 1);
        assert_eq!(views.topics[0].mean_virality, 10.0);
        assert_eq!(views.topics[0].mean_engagement, 8.0);
        assert_eq!(views.topics[0].count, 2);
    }

    #[test]
    fn test_weekly_trends_chronological_then_sector() {
        let mut late = raw("a", "tech", "x", 10, 0);
        late.timestamp = "2024-01-10T00:00:00Z".to_string();
        let mut early_finance = raw("b", "finance", "x", 4, 0);
        early_finance.timestamp = "2024-01-02T00:00:00Z".to_string();
        let early_tech = raw("c", "tech", "x", 6, 0);

        let trends = aggregate_by_week(&derive(&[late, early_finance, early_tech]));
        let keys: Vec<_> = trends
            .iter()
            .map(|t| (t.bucket.to_string(), t.sector.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01/2024-01-07".to_string(), "finance"),
                ("2024-01-01/2024-01-07".to_string(), "tech"),
                ("2024-01-08/2024-01-14".to_string(), "tech"),
            ]
        );
        assert_eq!(trends[1].mean_engagement, 6.0);
    }

    #[test]
    fn test_monthly_trends_merge_weeks() {
        let mut second = raw("b", "tech", "x", 20, 0);
        second.timestamp = "2024-01-20T00:00:00Z".to_string();
        let trends = aggregate_by_month(&derive(&[raw("a", "tech", "x", 10, 0), second]));
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].bucket.to_string(), "2024-01");
        assert_eq!(trends[0].mean_virality, 15.0);
    }

    #[test]
    fn test_sector_summary_singleton_std_undefined() {
        let summaries = sector_summaries(&derive(&[raw("a", "tech", "x", 10, 0)]));
        assert_eq!(summaries[0].virality.std, None);
        assert_eq!(summaries[0].virality.median, 10.0);
        assert_eq!(summaries[0].count, 1);
    }

    #[test]
    fn test_sub_entities_sorted_within_sector() {
        let mut low = raw("a", "tech", "x", 1, 0);
        low.sub_entity = "low".to_string();
        let mut high = raw("b", "tech", "x", 50, 0);
        high.sub_entity = "high".to_string();
        let mut other = raw("c", "art", "x", 3, 0);
        other.sub_entity = "paint".to_string();

        let rows = aggregate_by_sub_entity(&derive(&[low, high, other]));
        let names: Vec<_> = rows.iter().map(|r| r.sub_entity.as_str()).collect();
        assert_eq!(names, vec!["paint", "high", "low"]);
    }

    #[test]
    fn test_aggregations_are_deterministic() {
        let rows = vec![
            raw("a", "tech", "x", 10, 5),
            raw("b", "finance", "y", 3, 1),
            raw("c", "tech", "z", 7, 2),
        ];
        let records = derive(&rows);
        assert_eq!(aggregate_by_sector(&records), aggregate_by_sector(&records));
        assert_eq!(aggregate_by_topic(&records), aggregate_by_topic(&records));
        assert_eq!(aggregate_by_week(&records), aggregate_by_week(&records));
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        assert!(aggregate_by_sector(&[]).is_empty());
        assert!(aggregate_by_topic(&[]).top_by_virality.is_empty());
        assert!(aggregate_by_week(&[]).is_empty());
        assert!(sector_summaries(&[]).is_empty());
    }
}
