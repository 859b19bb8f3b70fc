use thiserror::Error;

/// Errors raised outside the projection core: token exchange, registry
/// requests and settings decoding.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no {0} in token response")]
    MissingField(&'static str),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("system clock is before the unix epoch")]
    Clock,
}

/// Result alias used by the token and registry clients.
pub type Result<T> = std::result::Result<T, Error>;
