//! HTTP transport types and the replaceable transport seam.
//!
//! # Design
//! Requests and responses are described as plain data. `Client` builds an
//! `HttpRequest`, hands it to a `Transport`, and parses the `HttpResponse`
//! that comes back. Only the transport touches the network, so tests can
//! swap in a closure (`from_fn`) or point the default `UreqTransport` at a
//! local mock server.
//!
//! Every Bitly v3 endpoint the client uses is a GET, so requests carry no
//! method or body.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::error::{Error, Result};

/// A GET request described as plain data.
///
/// `url` is fully built, query string and access token included. Treat it as
/// secret material; `Debug` omits the query.
#[derive(Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = match self.url.split_once('?') {
            Some((base, _)) => format!("{base}?<redacted>"),
            None => self.url.clone(),
        };
        f.debug_struct("HttpRequest")
            .field("url", &url)
            .field("headers", &self.headers)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// `status_text` is the full status line text, e.g. `"404 Not Found"`. The
/// body is kept as raw bytes; decoding is the client's job.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the canonical status line for `status` and no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_line(status),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes a single request. Implementations decide timeouts, TLS and
/// connection reuse; `Client` shares one transport across threads.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Wrap a closure as a `Transport`.
pub fn from_fn<F>(f: F) -> FnTransport<F>
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    FnTransport(f)
}

/// Transport returned by `from_fn`.
pub struct FnTransport<F>(F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (self.0)(request)
    }
}

/// Default transport backed by a blocking `ureq::Agent`.
///
/// HTTP error statuses are returned as data rather than `Err`, leaving status
/// interpretation to `Client`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(Error::transport)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(Error::transport)?;
        trace!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            status_text: status_line(status),
            headers,
            body,
        })
    }
}

/// `"404 Not Found"` for 404; just the number for codes without a reason phrase.
pub fn status_line(status: u16) -> String {
    let reason = ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason());
    match reason {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_includes_reason_phrase() {
        assert_eq!(status_line(404), "404 Not Found");
        assert_eq!(status_line(200), "200 OK");
        assert_eq!(status_line(599), "599");
    }

    #[test]
    fn fn_transport_delegates_to_closure() {
        let transport = from_fn(|req: &HttpRequest| Ok(HttpResponse::new(200, req.url.clone())));
        let response = transport
            .execute(&HttpRequest {
                url: "http://localhost/echo".to_string(),
                headers: Vec::new(),
            })
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "200 OK");
        assert_eq!(response.body, b"http://localhost/echo");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut response = HttpResponse::new(200, "{}");
        response
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn request_debug_hides_query() {
        let req = HttpRequest {
            url: "http://stub/shorten?access_token=secret".to_string(),
            headers: Vec::new(),
        };
        let rendered = format!("{req:?}");
        assert!(rendered.contains("http://stub/shorten?<redacted>"), "{rendered}");
        assert!(!rendered.contains("secret"));
    }
}
