//! Blocking client for the Bitly v3 URL-shortening API.
//!
//! # Overview
//! `Client` builds authenticated GET requests, hands them to a `Transport`,
//! and decodes the JSON envelope every endpoint returns. `Links` maps the
//! envelope's `data` into typed `Link` records for the shorten, expand,
//! info and lookup endpoints.
//!
//! ```no_run
//! let client = bitly_core::Client::new("<token>");
//! let link = client.links().shorten("https://www.rust-lang.org/")?;
//! println!("{}", link.url);
//! # Ok::<(), bitly_core::Error>(())
//! ```
//!
//! # Design
//! - `Client` holds only configuration; no state is kept between calls.
//! - The transport is a trait object so tests can inject a closure or point
//!   the default `ureq` transport at a local mock server.
//! - Decoding is two-phase: envelope first, then `data` per endpoint.
//! - The library emits `tracing` events at debug/trace level and never
//!   installs a subscriber. The access token is never logged.

pub mod client;
pub mod error;
pub mod http;
pub mod links;
pub mod types;

pub use client::{Client, ClientBuilder, Params, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use http::{from_fn, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use links::Links;
pub use types::{Envelope, Link};
