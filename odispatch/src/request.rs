//! Per-invocation request parts produced by argument decomposition.

use oschema::ParameterLocation;
use serde_json::{Map, Value};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Parameter values bucketed by where they travel on the wire.
///
/// Values are scalars or lists of scalars, in argument order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParametersByType {
    pub path: Map<String, Value>,
    pub query: Map<String, Value>,
    pub header: Map<String, Value>,
    pub cookie: Map<String, Value>,
}

impl ParametersByType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` in the bucket for `location`. Form parameters are never stored.
    pub fn insert(&mut self, location: ParameterLocation, name: impl Into<String>, value: Value) -> bool {
        let bucket = match location {
            ParameterLocation::Path => &mut self.path,
            ParameterLocation::Query => &mut self.query,
            ParameterLocation::Header => &mut self.header,
            ParameterLocation::Cookie => &mut self.cookie,
            ParameterLocation::Form => return false,
        };
        bucket.insert(name.into(), value);
        true
    }

    pub fn with(mut self, location: ParameterLocation, name: impl Into<String>, value: Value) -> Self {
        self.insert(location, name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty() && self.header.is_empty() && self.cookie.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    pub content_type: String,
    pub content: Value,
}

impl RequestBody {
    pub fn json(content: Value) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE.to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecomposedRequestData {
    pub parameters: ParametersByType,
    pub body: Option<RequestBody>,
}

impl DecomposedRequestData {
    pub fn new(parameters: ParametersByType, body: Option<RequestBody>) -> Self {
        Self { parameters, body }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}
