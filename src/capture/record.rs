//! Captured request records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A header value as seen on the wire: one value, or every value of a
/// repeated header in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Append another occurrence of the same header.
    pub fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }

    /// All values, in arrival order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// Header name (lowercase) to value(s).
pub type HeaderBag = BTreeMap<String, HeaderValue>;

/// Flat query-string map; the last occurrence of a key wins.
pub type QueryParams = BTreeMap<String, String>;

/// A normalized request that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCapture {
    pub session_id: String,
    pub method: String,
    pub body: Option<Value>,
    pub headers: HeaderBag,
    pub query_params: QueryParams,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
}

/// One persisted capture event.
///
/// Field names on the wire follow the dashboard contract: the session
/// identifier is `uuid`, the body is `data` and the receive time is
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub id: i64,
    #[serde(rename = "uuid")]
    pub session_id: String,
    #[serde(rename = "data")]
    pub body: Option<Value>,
    pub method: String,
    pub headers: HeaderBag,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub query_params: QueryParams,
    pub content_type: Option<String>,
    #[serde(rename = "created_at")]
    pub received_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CapturedRequest {
    /// Build the stored form of `capture` once the store has assigned
    /// an id and a receive time.
    pub fn from_new(id: i64, received_at: DateTime<Utc>, capture: NewCapture) -> Self {
        Self {
            id,
            session_id: capture.session_id,
            body: capture.body,
            method: capture.method,
            headers: capture.headers,
            ip_address: capture.ip_address,
            user_agent: capture.user_agent,
            query_params: capture.query_params,
            content_type: capture.content_type,
            received_at,
            updated_at: received_at,
        }
    }
}
