use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Maps sector labels to the sub-entities fetched for them.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "technology": ["technology", "programming"],
///   "finance": ["investing", "stocks"]
/// }
/// ```
/// For Reddit the entries are subreddit names, for Twitter search queries.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    sectors: BTreeMap<String, Vec<String>>,
}

impl TargetConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading targets {path}"))?;
        Self::from_json(&content).with_context(|| format!("parsing targets {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let sectors: BTreeMap<String, Vec<String>> = serde_json::from_str(content)?;
        Ok(Self { sectors })
    }

    /// Iterates over all `(sector, target)` pairs, sectors in sorted order and
    /// targets in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sectors.iter().flat_map(|(sector, targets)| {
            targets.iter().map(move |t| (sector.as_str(), t.as_str()))
        })
    }

    pub fn target_count(&self) -> usize {
        self.sectors.values().map(Vec::len).sum()
    }
}
