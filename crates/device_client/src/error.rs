use serde_json::Value;
use thiserror::Error;

/// Failure of a single downstream call. `endpoint` is the request path
/// without its query string so tokens never end up in error messages.
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("invalid device API url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("device API url '{url}' cannot carry path segments")]
    NotABaseUrl { url: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("malformed body from {endpoint}: {reason}")]
    MalformedBody { endpoint: String, reason: String },
    #[error("{endpoint} reported an unsuccessful request")]
    Rejected { endpoint: String, body: Value },
}

impl DownstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
