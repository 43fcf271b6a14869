mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use crate::errors::FetchError;
use serde::de::DeserializeOwned;

/// Issues a GET through `client` and returns the body of a successful response.
///
/// `target` names what is being fetched and is carried by every error.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
    target: &str,
) -> Result<Vec<u8>, FetchError> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| FetchError::Payload {
        target: target.to_string(),
        reason: format!("invalid url '{url}': {e}"),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let transport = |source: reqwest::Error| FetchError::Transport {
        target: target.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(transport)?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            target: target.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await.map_err(transport)?.to_vec())
}

/// [`fetch_bytes`] followed by JSON decoding.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    url: &str,
    target: &str,
) -> Result<T, FetchError> {
    let bytes = fetch_bytes(client, url, target).await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Payload {
        target: target.to_string(),
        reason: e.to_string(),
    })
}
