//! Document loading and filtering errors.
//!
//! ```rust
//! use oschema::{SchemaError, SchemaErrorKind};
//!
//! let error = SchemaError::unsupported_version("openapi '2.0' is not supported");
//! assert_eq!(error.kind, SchemaErrorKind::UnsupportedVersion);
//! assert!(error.to_string().contains("2.0"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    Parse,
    InvalidDocument,
    UnsupportedVersion,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

impl SchemaError {
    pub fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Parse, message)
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::InvalidDocument, message)
    }

    pub fn unsupported_version(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::UnsupportedVersion, message)
    }

    pub fn filter(filter_name: &str, message: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorKind::Filter,
            format!("filter '{filter_name}' failed: {}", message.into()),
        )
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SchemaError {}

impl From<serde_json::Error> for SchemaError {
    fn from(value: serde_json::Error) -> Self {
        Self::parse(format!("invalid JSON document: {value}"))
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::parse(format!("invalid YAML document: {value}"))
    }
}
