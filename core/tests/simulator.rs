//! Full shorten → expand → info → lookup flow against the stateful mock.
//!
//! # Design
//! Starts the simulator on a random port and exercises every `Links`
//! operation over real HTTP, so request encoding and response decoding are
//! checked against a server that actually interprets the parameters.

mod common;

use bitly_core::Client;
use common::{spawn, TOKEN};

#[test]
fn link_lifecycle() {
    let base_url = spawn(mock_server::app(TOKEN));
    let client = Client::builder(TOKEN).base_url(&base_url).build().unwrap();
    let links = client.links();

    // Step 1: lookup before anything exists.
    let found = links.lookup(&["http://www.rust-lang.org/"]).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].error.as_deref(), Some("NOT_FOUND"));

    // Step 2: shorten mints a new hash.
    let created = links.shorten("http://www.rust-lang.org/").unwrap();
    assert_eq!(created.long_url, "http://www.rust-lang.org/");
    assert_eq!(created.new_hash, 1);
    assert_eq!(created.hash.len(), 6);
    assert_eq!(created.url, format!("{}{}", mock_server::SHORT_DOMAIN, created.hash));

    // Step 3: shortening again reuses it.
    let again = links.shorten("http://www.rust-lang.org/").unwrap();
    assert_eq!(again.hash, created.hash);
    assert_eq!(again.new_hash, 0);

    // Step 4: expand by short URL and by hash, plus an unknown one.
    let expanded = links.expand(&[created.url.as_str(), "http://bit.ly/nope00"]).unwrap();
    assert_eq!(expanded.len(), 2);
    assert_eq!(expanded[0].long_url, "http://www.rust-lang.org/");
    assert_eq!(expanded[0].short_url, created.url);
    assert!(expanded[0].is_found());
    assert!(!expanded[1].is_found());

    let by_hash = links.expand_hashes(&[created.hash.as_str()]).unwrap();
    assert_eq!(by_hash[0].hash, created.hash);
    assert_eq!(by_hash[0].long_url, "http://www.rust-lang.org/");

    // Step 5: info.
    let info = links.info(&[created.url.as_str()]).unwrap();
    assert_eq!(info[0].global_hash, created.hash);
    assert_eq!(info[0].created_by.as_deref(), Some("mockuser"));
    assert!(info[0].created_at > 0);
    assert_eq!(info[0].title, None);

    // Step 6: lookup now finds the aggregate link, in request order.
    let found = links
        .lookup(&["http://unknown.example/", "http://www.rust-lang.org/"])
        .unwrap();
    assert_eq!(found[0].url, "http://unknown.example/");
    assert!(!found[0].is_found());
    assert_eq!(found[1].aggregate_link, created.url);
}

#[test]
fn wrong_token_is_api_error() {
    let base_url = spawn(mock_server::app(TOKEN));
    let client = Client::builder("wrong").base_url(&base_url).build().unwrap();

    let err = client.links().shorten("http://www.rust-lang.org/").unwrap_err();
    assert!(err.is_api());
    assert_eq!(err.to_string(), "500: INVALID_ACCESS_TOKEN");
}

#[test]
fn missing_argument_is_api_error() {
    let base_url = spawn(mock_server::app(TOKEN));
    let client = Client::builder(TOKEN).base_url(&base_url).build().unwrap();

    let err = client.links().lookup(&[]).unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.to_string(), "500: MISSING_ARG_URL");
}
