//! Dispatch context: the mapping handed to every handler in a chain.
//!
//! Contributions are merged key by key, later ones overwriting earlier ones:
//!
//! ```text
//! global middleware < requestQuery < requestBody < routeParams < handler results
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

pub const REQUEST_QUERY: &str = "requestQuery";
pub const REQUEST_BODY: &str = "requestBody";
pub const ROUTE_PARAMS: &str = "routeParams";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DispatchContext {
    fields: Map<String, Value>,
}

impl DispatchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite keys with the fields of `contribution`.
    ///
    /// Only objects contribute; `null`, scalars and arrays are ignored, the
    /// same way a handler returning nothing leaves the context alone.
    pub fn merge(&mut self, contribution: Value) {
        if let Value::Object(fields) = contribution {
            self.fields.extend(fields);
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.fields.get(ROUTE_PARAMS)?.get(name)?.as_str()
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.fields.get(REQUEST_QUERY)?.get(name)?.as_str()
    }

    #[must_use]
    pub fn request_body(&self) -> Option<&Value> {
        self.fields.get(REQUEST_BODY)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for DispatchContext {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
