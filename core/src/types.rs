//! Response envelope and record types for the Bitly v3 API.
//!
//! # Design
//! Every v3 response is wrapped in the same envelope, but `data` changes
//! shape per endpoint. Decoding happens in two phases: the envelope first,
//! with `data` kept as a `serde_json::Value`, then `into_data` / `into_list`
//! once the caller knows what the endpoint returns.

use serde::de::{self, DeserializeOwned, Unexpected};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// The JSON envelope wrapping every API response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub status_code: i64,
    pub status_txt: String,
    pub data: Value,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// Decode `data` as a single record. `data` must be a JSON object.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        match self.data {
            data @ Value::Object(_) => serde_json::from_value(data).map_err(Error::Shape),
            other => Err(not_an_object(&other)),
        }
    }

    /// Decode the array stored under `data[key]`.
    ///
    /// `data` must be an object; a missing key is a shape error, not an
    /// empty list.
    pub fn into_list<T: DeserializeOwned>(self, key: &str) -> Result<Vec<T>> {
        let list = match self.data {
            Value::Object(mut map) => map
                .remove(key)
                .ok_or_else(|| Error::Shape(de::Error::custom(format_args!("missing field `{key}`"))))?,
            other => return Err(not_an_object(&other)),
        };
        match list {
            list @ Value::Array(_) => serde_json::from_value(list).map_err(Error::Shape),
            other => Err(Error::Shape(de::Error::invalid_type(
                unexpected(&other),
                &"an array",
            ))),
        }
    }
}

fn not_an_object(value: &Value) -> Error {
    Error::Shape(de::Error::invalid_type(unexpected(value), &"an object"))
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// A bitlink as returned by the link endpoints.
///
/// Each endpoint fills a different subset of fields; the rest keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Link {
    pub short_url: String,
    pub long_url: String,
    pub global_hash: String,
    pub user_hash: String,
    pub hash: String,
    pub new_hash: i64,
    pub title: Option<String>,
    pub url: String,
    pub aggregate_link: String,
    pub created_at: i64,
    pub created_by: Option<String>,
    /// Per-item failure inside a successful envelope, e.g. `NOT_FOUND`.
    pub error: Option<String>,
}

impl Link {
    pub fn is_found(&self) -> bool {
        self.error.is_none()
    }
}
