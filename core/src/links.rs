//! Link-related endpoints: shorten, expand, info, lookup.
//!
//! Each method knows its endpoint path, the query parameter name the API
//! expects, and where in `data` the records live.

use tracing::debug;

use crate::client::{Client, Params};
use crate::error::Result;
use crate::types::Link;

/// Façade over `Client` for the link endpoints. Obtained via `Client::links`.
#[derive(Debug, Clone, Copy)]
pub struct Links<'a> {
    client: &'a Client,
}

impl<'a> Links<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Shorten `long_url`.
    ///
    /// Returns e.g. `Link { long_url: "http://google.com/", hash: "ze6poY",
    /// url: "http://bit.ly/ze6poY", .. }`. `new_hash` is 1 when the API
    /// minted a new hash for this URL.
    ///
    /// Bitly API docs: <http://dev.bitly.com/links.html#v3_shorten>
    pub fn shorten(&self, long_url: &str) -> Result<Link> {
        let params = Params::from([("longUrl".to_string(), vec![long_url.to_string()])]);
        let link: Link = self.client.get("/shorten", params)?.into_data()?;
        debug!(hash = %link.hash, new_hash = link.new_hash, "shortened");
        Ok(link)
    }

    /// Long URLs for the given short URLs.
    ///
    /// Bitly API docs: <http://dev.bitly.com/links.html#v3_expand>
    pub fn expand(&self, short_urls: &[&str]) -> Result<Vec<Link>> {
        self.list("/expand", "shortUrl", short_urls, "expand")
    }

    /// Long URLs for the given bitlink hashes, e.g. `"1RmnUT"`.
    pub fn expand_hashes(&self, hashes: &[&str]) -> Result<Vec<Link>> {
        self.list("/expand", "hash", hashes, "expand")
    }

    /// Page title, creator and creation time for the given short URLs.
    ///
    /// Bitly API docs: <http://dev.bitly.com/links.html#v3_info>
    pub fn info(&self, short_urls: &[&str]) -> Result<Vec<Link>> {
        self.list("/info", "shortUrl", short_urls, "info")
    }

    /// Existing bitlinks for the given long URLs; `aggregate_link` is set
    /// for URLs that have one.
    ///
    /// Bitly API docs: <https://dev.bitly.com/links.html#v3_link_lookup>
    pub fn lookup(&self, urls: &[&str]) -> Result<Vec<Link>> {
        self.list("/link/lookup", "url", urls, "link_lookup")
    }

    fn list(&self, path: &str, param: &str, values: &[&str], key: &str) -> Result<Vec<Link>> {
        let params = Params::from([(
            param.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        )]);
        let links: Vec<Link> = self.client.get(path, params)?.into_list(key)?;
        debug!(path, requested = values.len(), returned = links.len(), "decoded links");
        Ok(links)
    }
}
