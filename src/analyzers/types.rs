//! Data types used by the metrics pipeline.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Social platform a dataset was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
}

impl Platform {
    /// Engagement-rate normalisation used for datasets from this platform.
    pub fn rate_policy(self) -> EngagementRatePolicy {
        match self {
            Platform::Reddit => EngagementRatePolicy::PerAudience,
            Platform::Twitter => EngagementRatePolicy::PerSectorCount,
        }
    }

    /// Plural name of the second-level grouping, as shown in reports.
    pub fn sub_entity_label(self) -> &'static str {
        match self {
            Platform::Reddit => "Subreddits",
            Platform::Twitter => "Searches",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Reddit => f.write_str("Reddit"),
            Platform::Twitter => f.write_str("Twitter"),
        }
    }
}

/// How `engagement_rate` is normalised.
///
/// The two variants use different denominators, so rates computed under
/// different policies are not comparable with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementRatePolicy {
    /// `engagement / audience_size` of the record itself.
    PerAudience,
    /// `engagement / rows sharing the record's sector` in the same batch.
    PerSectorCount,
}

/// One fetched post or tweet, as produced by the ingestion adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub sector: String,
    /// Subreddit name, or the search target for Twitter.
    pub sub_entity: String,
    pub topic: String,
    pub engagement: u64,
    /// Crossposts for Reddit, retweets for Twitter.
    pub secondary_amplifier: u64,
    pub timestamp: String,
    pub audience_size: Option<u64>,
}

/// Monday-starting calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekBucket(NaiveDate);

impl WeekBucket {
    pub fn containing(at: NaiveDateTime) -> Self {
        let date = at.date();
        let offset = date.weekday().num_days_from_monday() as i64;
        WeekBucket(date - Duration::days(offset))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.0 + Duration::days(6)
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start(), self.end())
    }
}

impl Serialize for WeekBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    year: i32,
    month: u32,
}

impl MonthBucket {
    pub fn containing(at: NaiveDateTime) -> Self {
        MonthBucket {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A [`RawRecord`] plus the fields computed by preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub record: RawRecord,
    pub date: NaiveDateTime,
    pub week: WeekBucket,
    pub month: MonthBucket,
    /// `engagement + 2 * secondary_amplifier`.
    pub virality: u64,
    /// `None` when the rate is undefined (zero or unknown audience).
    pub engagement_rate: Option<f64>,
}

/// Mean, median and sample standard deviation of one metric within a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
}

/// Per-sector means, one row per distinct sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub sector: String,
    pub mean_virality: f64,
    pub mean_engagement: f64,
    /// Mean over the rows whose rate is defined; `None` if there are none.
    pub mean_engagement_rate: Option<f64>,
    pub count: usize,
}

/// Per-(sector, topic) means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPerformance {
    pub sector: String,
    pub topic: String,
    pub mean_virality: f64,
    pub mean_engagement: f64,
    pub count: usize,
}

/// Topic table plus its two ranked views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicViews {
    pub topics: Vec<TopicPerformance>,
    pub top_by_virality: Vec<TopicPerformance>,
    pub top_by_engagement: Vec<TopicPerformance>,
}

/// Per-(bucket, sector) means for trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint<B> {
    pub bucket: B,
    pub sector: String,
    pub mean_virality: f64,
    pub mean_engagement: f64,
    pub count: usize,
}

/// Per-(sector, sub-entity) means for the top-performer section of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubEntityPerformance {
    pub sector: String,
    pub sub_entity: String,
    pub mean_virality: f64,
    pub mean_engagement: f64,
    pub count: usize,
}

/// Full descriptive statistics for one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub virality: Summary,
    pub engagement: Summary,
    pub count: usize,
}
