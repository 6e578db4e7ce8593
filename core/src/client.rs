//! Low-level client for the Bitly v3 API.
//!
//! # Design
//! `Client` holds the access token, base URL, and a shared `Transport`, and
//! carries no mutable state between calls. `get` is split into
//! `build_get` (produces an `HttpRequest`), the transport round-trip, and
//! `parse_envelope` (consumes the `HttpResponse`), so each step can be tested
//! on its own. Resource groups such as `Links` sit on top of `get`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::links::Links;
use crate::types::Envelope;

/// Production endpoint of the v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api-ssl.bitly.com/v3";

const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Multi-valued query parameters. Keys encode in sorted order.
pub type Params = BTreeMap<String, Vec<String>>;

/// Blocking client for the Bitly v3 API.
///
/// Cloning is cheap: clones share the same transport.
#[derive(Clone)]
pub struct Client {
    access_token: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client for the production API using the default `ureq` transport.
    ///
    /// To create a token see <https://dev.bitly.com/authentication.html>.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: Arc::new(UreqTransport::default()),
        }
    }

    pub fn builder(access_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(access_token.into())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Link endpoints: shorten, expand, info, lookup.
    pub fn links(&self) -> Links<'_> {
        Links::new(self)
    }

    /// Issue a GET against `path` and return the decoded envelope.
    ///
    /// `access_token` is always set from the client's token, replacing any
    /// value supplied in `params`.
    #[instrument(level = "debug", skip(self, params))]
    pub fn get(&self, path: &str, params: Params) -> Result<Envelope> {
        let request = self.build_get(path, params)?;
        let response = self.transport.execute(&request)?;
        debug!(
            status = response.status,
            content_type = response.header("content-type"),
            "response received"
        );
        self.parse_envelope(response)
    }

    /// Build the request `get` would send, without sending it.
    pub fn build_get(&self, path: &str, mut params: Params) -> Result<HttpRequest> {
        validate_path(path)?;

        let mut url = parse_base_url(&self.base_url)?;
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);

        params.insert(
            ACCESS_TOKEN_PARAM.to_string(),
            vec![self.access_token.clone()],
        );
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, values) in &params {
                for value in values {
                    query.append_pair(key, value);
                }
            }
        }

        Ok(HttpRequest {
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    /// Check the HTTP status, decode the envelope, then check its status.
    pub fn parse_envelope(&self, response: HttpResponse) -> Result<Envelope> {
        if response.status != 200 {
            return Err(Error::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }

        let envelope: Envelope = serde_json::from_slice(&response.body).map_err(Error::Json)?;
        if !envelope.is_ok() {
            debug!(
                status_code = envelope.status_code,
                status_txt = %envelope.status_txt,
                "API reported an error"
            );
            return Err(Error::Api {
                status_code: envelope.status_code,
                status_txt: envelope.status_txt,
            });
        }
        Ok(envelope)
    }
}

/// Builder for a `Client` with a non-default base URL, timeout, or transport.
pub struct ClientBuilder {
    access_token: String,
    base_url: String,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    fn new(access_token: String) -> Self {
        Self {
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            transport: None,
        }
    }

    /// Point the client at another server, e.g. a local mock.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Global per-request timeout for the default transport. Ignored when a
    /// custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Fails with `Error::InvalidBaseUrl` if the base URL is not absolute or
    /// has a query or fragment.
    pub fn build(self) -> Result<Client> {
        parse_base_url(&self.base_url)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::new(self.timeout)),
        };

        Ok(Client {
            access_token: self.access_token,
            base_url: self.base_url,
            transport,
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(url)
}

fn validate_path(path: &str) -> Result<()> {
    let reason = if !path.starts_with('/') {
        Some("must start with '/'")
    } else if path.contains(['?', '#']) {
        Some("query and fragment are not allowed")
    } else if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("contains whitespace or control characters")
    } else if !has_valid_escapes(path) {
        Some("invalid percent-encoding")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn has_valid_escapes(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
