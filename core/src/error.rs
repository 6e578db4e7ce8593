//! Error types for the Bitly API client.
//!
//! # Design
//! Variants follow the order in which a request can fail: building the URL,
//! reaching the server, the HTTP status line, decoding the JSON envelope, the
//! envelope's own status, and finally decoding `data` into typed records.
//! `Http` and `Api` render as `"{code}: {text}"` so both read the same way in
//! logs; `status_code()` lets callers tell them apart without matching on
//! strings.

use thiserror::Error;

/// Errors returned by `Client` and the resource groups built on top of it.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured base URL is not an absolute URL, or carries a query or
    /// fragment that request paths cannot be appended to.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request path cannot be used as a URL path.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The request never produced an HTTP response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with an HTTP status other than 200.
    #[error("{status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// The response body is not a JSON envelope.
    #[error("malformed JSON response: {0}")]
    Json(#[source] serde_json::Error),

    /// The envelope decoded but reports a non-200 status, e.g. `RATE_LIMIT_EXCEEDED`.
    #[error("{}", api_message(*status_code, status_txt))]
    Api { status_code: i64, status_txt: String },

    /// `data` does not have the shape the endpoint promises.
    #[error("unexpected response data: {0}")]
    Shape(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The HTTP or envelope status carried by this error, if any.
    pub fn status_code(&self) -> Option<i64> {
        match self {
            Error::Http { status, .. } => Some(i64::from(*status)),
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True when the failure was reported by the API itself rather than the
    /// HTTP layer or the decoder.
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    /// Wrap a network-level failure; for custom `Transport` implementations.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport(Box::new(err))
    }
}

fn api_message(status_code: i64, status_txt: &str) -> String {
    if status_code == 0 {
        return "No status code given".to_string();
    }
    format!("{status_code}: {status_txt}")
}
