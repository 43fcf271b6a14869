use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::services::source_api::PostSource;
use social_trends::analyzers::types::{Platform, RawRecord};
use social_trends::errors::FetchError;
use social_trends::fetch::auth::ApiKey;
use social_trends::fetch::{BasicClient, fetch_json};
use social_trends::parser::topic_from_text;

/// Bounds the v2 recent-search endpoint accepts for `max_results`.
const MIN_RESULTS: u32 = 10;
const MAX_RESULTS: u32 = 100;

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: String,
    public_metrics: PublicMetrics,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    retweet_count: u64,
    reply_count: u64,
    like_count: u64,
}

pub struct TwitterClient {
    http: ApiKey<BasicClient>,
    base_url: String,
    max_results: u32,
}

impl TwitterClient {
    pub fn new(bearer_token: &str, max_results: u32) -> Result<Self> {
        let http = ApiKey::bearer(BasicClient::new(), bearer_token)?;
        Ok(Self {
            http,
            base_url: "https://api.twitter.com/2".to_string(),
            max_results: max_results.clamp(MIN_RESULTS, MAX_RESULTS),
        })
    }

    pub fn from_env(max_results: u32) -> Result<Self> {
        let token =
            std::env::var("TWITTER_BEARER_TOKEN").context("TWITTER_BEARER_TOKEN must be set")?;
        Self::new(&token, max_results)
    }

    fn search_url(&self, query: &str) -> Result<reqwest::Url, FetchError> {
        let max_results = self.max_results.to_string();
        reqwest::Url::parse_with_params(
            &format!("{}/tweets/search/recent", self.base_url),
            &[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,public_metrics"),
            ],
        )
        .map_err(|e| FetchError::Payload {
            target: query.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Maps one tweet to a record. Likes and replies are the engagement,
/// retweets the amplifier; tweets carry no audience size.
fn record_from_tweet(tweet: Tweet, sector: &str, query: &str) -> RawRecord {
    let metrics = &tweet.public_metrics;
    RawRecord {
        topic: topic_from_text(&tweet.text),
        engagement: metrics.like_count + metrics.reply_count,
        secondary_amplifier: metrics.retweet_count,
        timestamp: tweet.created_at,
        audience_size: None,
        id: tweet.id,
        sector: sector.to_string(),
        sub_entity: query.to_string(),
    }
}

#[async_trait]
impl PostSource for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch_target(&self, sector: &str, query: &str) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.search_url(query)?;
        let response: SearchResponse = fetch_json(&self.http, url.as_str(), query).await?;
        debug!(tweets = response.data.len(), "Search results decoded");

        Ok(response
            .data
            .into_iter()
            .map(|tweet| record_from_tweet(tweet, sector, query))
            .collect())
    }
}
