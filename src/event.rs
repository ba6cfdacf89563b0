//! # Event Module
//!
//! The router only ever sees events that the host runtime has already parsed.
//! [`RawEvent`] is the serde model of that input: the fields the router
//! reads are typed, and everything else the host sends is kept in
//! [`RawEvent::extra`] so handlers can still reach it.
//!
//! The configured event mapper turns a `RawEvent` into a [`MappedEvent`],
//! the `(path, method, query)` triple used for routing. This is the boundary
//! where malformed input is rejected with
//! [`RouterError::InvalidEvent`](crate::RouterError::InvalidEvent).
//!
//! ## Accepted shape
//!
//! ```json
//! {
//!   "httpMethod": "POST",
//!   "path": "/bar/baz",
//!   "queryStringParameters": { "foo": "2" },
//!   "headers": { "Authorization": "token" },
//!   "body": "{\"a\":1}",
//!   "isBase64Encoded": false
//! }
//! ```
//!
//! `method` is accepted in place of `httpMethod`. `path` is required.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::RouterError;

/// Raw event as delivered by the host runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// API Gateway style method field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    /// Alternative method field used by some hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    /// Every other field of the host event, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEvent {
    /// Minimal event with a method and a path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: Some(method.into()),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse an untyped host event.
    pub fn from_value(value: Value) -> Result<Self, RouterError> {
        serde_json::from_value(value).map_err(|e| RouterError::InvalidEvent {
            reason: e.to_string(),
        })
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// The method field, preferring `httpMethod` over `method`.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.http_method.as_deref().or(self.method.as_deref())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body text after undoing base64 transfer encoding.
    ///
    /// Bodies flagged as base64 that fail to decode (or are not UTF-8) are
    /// returned as sent.
    #[must_use]
    pub fn decoded_body(&self) -> Option<String> {
        let raw = self.body.as_deref()?;
        if self.is_base64_encoded {
            if let Some(text) = base64::engine::general_purpose::STANDARD
                .decode(raw)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
            {
                return Some(text);
            }
        }
        Some(raw.to_string())
    }

    /// Body parsed as JSON, falling back to the unparsed text.
    ///
    /// Never fails: a malformed body comes back as `Value::String`. Absent and
    /// empty bodies, and a body of literal `null`, yield `None`.
    #[must_use]
    pub fn parsed_body(&self) -> Option<Value> {
        let text = self.decoded_body().filter(|b| !b.is_empty())?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(_) => Some(Value::String(text)),
        }
    }
}

/// Routing view of an event, produced by the event mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedEvent {
    pub path: String,
    pub http_method: String,
    pub query: Option<HashMap<String, String>>,
}

/// Default event mapper: reads the routing fields straight off the event.
pub fn identity_mapper(event: &RawEvent) -> Result<MappedEvent, RouterError> {
    let http_method = event
        .method()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| RouterError::InvalidEvent {
            reason: "event has neither httpMethod nor method".to_string(),
        })?;

    Ok(MappedEvent {
        path: event.path.clone(),
        http_method: http_method.to_string(),
        query: event.query_string_parameters.clone(),
    })
}
