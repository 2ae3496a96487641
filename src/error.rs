use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {}s waiting for {what}", .after.as_secs_f32())]
    Timeout { what: String, after: Duration },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("element `{0}` not found")]
    MissingElement(String),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
