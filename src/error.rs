//! Error types shared by the fetch, normalizer and storage layers

use thiserror::Error;

use crate::models::market::MarketType;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The attempt did not complete before its deadline and was cancelled
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// 2xx response on a JSON endpoint that did not carry JSON
    #[error("non-JSON response from {url}: {detail}")]
    NonJsonResponse { url: String, detail: String },

    /// 2xx response carrying the exchange's `{code, msg}` error envelope
    #[error("exchange error payload from {url}: code={code} msg={msg}")]
    ErrorPayload { url: String, code: String, msg: String },

    /// DNS, connect or transport level failure
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("malformed market data: {0}")]
    MalformedData(String),

    /// Every direct and relayed attempt failed
    #[error("all hosts exhausted for {market} {path} after {attempts} attempts: {last}")]
    AllHostsExhausted {
        market: MarketType,
        path: String,
        attempts: usize,
        #[source]
        last: Box<Error>,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("key-value store error: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The underlying error of an exhausted resolution, or the error itself
    pub fn last_attempt_error(&self) -> &Error {
        match self {
            Error::AllHostsExhausted { last, .. } => last,
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.last_attempt_error(), Error::Timeout { .. })
    }

    /// Short label used for metrics and structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Timeout { .. } => "timeout",
            Error::HttpStatus { .. } => "http_status",
            Error::NonJsonResponse { .. } => "non_json",
            Error::ErrorPayload { .. } => "error_payload",
            Error::Network { .. } => "network",
            Error::MalformedData(_) => "malformed_data",
            Error::AllHostsExhausted { .. } => "all_hosts_exhausted",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Store(_) => "store",
            Error::Config(_) => "config",
            Error::Json(_) => "json",
        }
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Store(err.to_string())
    }
}
