//! HTTP client for the upstream gift provider.
//!
//! Gated behind the `client` cargo feature so crates that only need the
//! shared types do not pull in `reqwest`.

mod upstream;

pub use upstream::UpstreamClient;

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::ErrorKind;

/// Default per-request timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of idle connections kept per provider host.
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 20;

/// Default number of extra attempts after a connection failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings for [`UpstreamClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL of the provider API; endpoint paths are appended to it.
    pub base_url: Url,
    /// Shared key sent in the `API-Key` header.
    pub api_key: String,
    /// Overall timeout of a single request.
    pub timeout: Duration,
    /// Upper bound of idle pooled connections per host.
    pub max_idle_per_host: usize,
    /// How many times a request is re-sent when the connection could not
    /// be established. Requests that reached the provider are never re-sent.
    pub max_retries: u32,
}

impl ClientConfig {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Errors produced by the upstream client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request parameters (400).
    #[error("invalid request parameters")]
    BadRequest,

    /// The provider rejected our API key (401).
    #[error("upstream rejected gateway credentials")]
    Unauthorized,

    /// The provider does not know the requested resource (404).
    #[error("resource not found")]
    NotFound,

    /// Any other status that is not the expected success code.
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(StatusCode),

    /// The success body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(serde_json::Error),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Classify this error into the gateway taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::BadRequest => ErrorKind::Validation,
            ClientError::Unauthorized => ErrorKind::Unauthorized,
            ClientError::NotFound => ErrorKind::NotFound,
            ClientError::Http(_)
            | ClientError::UnexpectedStatus(_)
            | ClientError::Decode(_)
            | ClientError::Encode(_)
            | ClientError::Url(_) => ErrorKind::Internal,
        }
    }

    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ClientError::BadRequest,
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound,
            other => ClientError::UnexpectedStatus(other),
        }
    }
}
