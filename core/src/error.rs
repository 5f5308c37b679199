//! Error types for the item service client.
//!
//! # Design
//! `TransportError` is the one failure kind the sync layer surfaces. Its
//! variants keep the cause around for logs and display, but the controller
//! never branches on them: a 404 and a dropped connection are recorded the
//! same way.

use thiserror::Error;

/// Any failed remote call: bad status, network failure, or a response that
/// could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("network failure: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("malformed response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("request payload could not be encoded: {0}")]
    Encode(String),

    /// A successful create response did not name the new identifier.
    #[error("create response carried no location header")]
    MissingLocation,

    /// The identifier cannot be written as a single URL path segment.
    #[error("identifier {0:?} cannot address an item")]
    UnaddressableId(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Network(e.to_string())
    }
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
