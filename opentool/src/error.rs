//! Facade error type for loading, reloading and wiring the bridge.
//!
//! ```rust
//! use opentool::{BridgeError, BridgeErrorKind};
//! use oschema::SchemaError;
//!
//! let err: BridgeError = SchemaError::parse("unexpected token").into();
//! assert_eq!(err.kind, BridgeErrorKind::Document);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use odispatch::TransportError;
use oschema::SchemaError;
use otooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeErrorKind {
    Config,
    Source,
    Document,
    Tooling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    pub kind: BridgeErrorKind,
    pub message: String,
}

impl BridgeError {
    pub fn new(kind: BridgeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Config, message)
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Source, message)
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Document, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Tooling, message)
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BridgeError {}

impl From<SchemaError> for BridgeError {
    fn from(value: SchemaError) -> Self {
        Self::document(value.to_string())
    }
}

impl From<ToolError> for BridgeError {
    fn from(value: ToolError) -> Self {
        Self::tooling(value.to_string())
    }
}

impl From<TransportError> for BridgeError {
    fn from(value: TransportError) -> Self {
        Self::source(value.to_string())
    }
}
