//! Typed errors for dataset parsing and platform fetches.

use thiserror::Error;

/// Failure to turn a raw dataset value into a typed one.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("record '{record_id}' has an unparseable timestamp '{value}'")]
    Timestamp { record_id: String, value: String },
    #[error("dataset row {row} is malformed: {reason}")]
    Row { row: usize, reason: String },
}

/// Failure to fetch posts for a single (sector, target) pair.
///
/// These are collected per target rather than aborting the whole run, so a
/// fetch can report how many targets failed and why.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for '{target}' failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{target}' returned HTTP {status}: {body}")]
    Status {
        target: String,
        status: u16,
        body: String,
    },
    #[error("'{target}' returned an undecodable payload: {reason}")]
    Payload { target: String, reason: String },
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl FetchError {
    /// Short machine-friendly label, used as the `error_type` column in fetch logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport_error",
            FetchError::Status { .. } => "status_error",
            FetchError::Payload { .. } => "payload_error",
            FetchError::Auth(_) => "auth_error",
        }
    }
}
