use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::services::source_api::PostSource;
use social_trends::analyzers::types::{Platform, RawRecord};
use social_trends::errors::FetchError;
use social_trends::fetch::auth::ApiKey;
use social_trends::fetch::{BasicClient, fetch_json};
use social_trends::parser::topic_from_text;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// App-only OAuth credentials for a Reddit "script" application.
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).with_context(|| format!("{name} must be set"));
        Ok(Self {
            client_id: var("REDDIT_CLIENT_ID")?,
            client_secret: var("REDDIT_CLIENT_SECRET")?,
            user_agent: var("REDDIT_USER_AGENT")?,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    score: i64,
    num_comments: u64,
    #[serde(default)]
    num_crossposts: u64,
    created_utc: f64,
}

#[derive(Deserialize)]
struct About {
    data: AboutData,
}

#[derive(Deserialize)]
struct AboutData {
    subscribers: Option<u64>,
}

pub struct RedditClient {
    http: ApiKey<BasicClient>,
    base_url: String,
    time_filter: String,
    limit: u32,
}

impl RedditClient {
    pub async fn new(credentials: RedditCredentials, time_filter: &str, limit: u32) -> Result<Self> {
        // Exchange client credentials for an access token
        let access_token = Self::exchange_token(&credentials).await?;
        let http = ApiKey::bearer(
            BasicClient::with_user_agent(&credentials.user_agent)?,
            &access_token,
        )?;

        Ok(Self {
            http,
            base_url: "https://oauth.reddit.com".to_string(),
            time_filter: time_filter.to_string(),
            limit,
        })
    }

    async fn exchange_token(credentials: &RedditCredentials) -> Result<String> {
        let client = reqwest::Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send token request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Auth(format!(
                "token exchange failed with status {status}: {body}"
            ))
            .into());
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))?;

        Ok(token_response.access_token)
    }

    async fn subscribers(&self, subreddit: &str) -> Result<Option<u64>, FetchError> {
        let url = format!("{}/r/{}/about", self.base_url, subreddit);
        let about: About = fetch_json(&self.http, &url, subreddit).await?;
        Ok(about.data.subscribers)
    }
}

/// Maps one listing post to a record.
///
/// Engagement is `score + comments` with a negative score counted as zero;
/// crossposts are the amplifier.
fn record_from_post(
    post: Post,
    sector: &str,
    subreddit: &str,
    subscribers: Option<u64>,
) -> Result<RawRecord, FetchError> {
    let secs = post.created_utc.trunc() as i64;
    let created = DateTime::from_timestamp(secs, 0).ok_or_else(|| FetchError::Payload {
        target: subreddit.to_string(),
        reason: format!("post {} has invalid created_utc {}", post.id, post.created_utc),
    })?;

    Ok(RawRecord {
        topic: topic_from_text(&post.title),
        engagement: post.score.max(0) as u64 + post.num_comments,
        secondary_amplifier: post.num_crossposts,
        timestamp: created.to_rfc3339(),
        audience_size: subscribers,
        id: post.id,
        sector: sector.to_string(),
        sub_entity: subreddit.to_string(),
    })
}

#[async_trait]
impl PostSource for RedditClient {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch_target(
        &self,
        sector: &str,
        subreddit: &str,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let subscribers = self.subscribers(subreddit).await?;

        let url = format!(
            "{}/r/{}/top?t={}&limit={}&raw_json=1",
            self.base_url, subreddit, self.time_filter, self.limit
        );
        let listing: Listing = fetch_json(&self.http, &url, subreddit).await?;
        debug!(posts = listing.data.children.len(), ?subscribers, "Listing decoded");

        listing
            .data
            .children
            .into_iter()
            .map(|child| record_from_post(child.data, sector, subreddit, subscribers))
            .collect()
    }
}
