//! Strategies that derive a tool name from an operation.
//!
//! ```rust
//! use otooling::{NamingConfig, NamingStrategyKind};
//! use oschema::{HttpMethod, OperationDescriptor};
//!
//! let operation = OperationDescriptor::new(HttpMethod::Get, "/users/{user-id}")
//!     .with_operation_id("Users.GetById");
//!
//! let sanitized = NamingConfig::default().strategy().expect("default config is valid");
//! assert_eq!(sanitized.name(&operation).expect("id is usable"), "users_getbyid");
//!
//! let endpoint = NamingConfig::new(NamingStrategyKind::Endpoint)
//!     .with_max_length(9)
//!     .strategy()
//!     .expect("limit is positive");
//! assert_eq!(endpoint.name(&operation).expect("path is usable"), "get_users");
//! ```

use oschema::OperationDescriptor;
use serde::{Deserialize, Serialize};

use crate::ToolError;

pub trait NamingStrategy: Send + Sync {
    fn name(&self, operation: &OperationDescriptor) -> Result<String, ToolError>;
}

/// The operation id exactly as written in the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationIdNaming;

impl NamingStrategy for OperationIdNaming {
    fn name(&self, operation: &OperationDescriptor) -> Result<String, ToolError> {
        let operation_id = require_operation_id(operation)?;
        if operation_id.trim().is_empty() {
            return Err(ToolError::naming(format!(
                "operation id of {} {} is blank",
                operation.method, operation.path
            )));
        }
        Ok(operation_id.to_string())
    }
}

/// Lowercase alphanumerics of the operation id joined by single underscores.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizedOperationIdNaming;

impl NamingStrategy for SanitizedOperationIdNaming {
    fn name(&self, operation: &OperationDescriptor) -> Result<String, ToolError> {
        let operation_id = require_operation_id(operation)?;

        let mut name = String::with_capacity(operation_id.len());
        for character in operation_id.chars() {
            if character.is_ascii_alphanumeric() {
                name.push(character.to_ascii_lowercase());
            } else if !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
        }
        if name.ends_with('_') {
            name.pop();
        }

        if name.is_empty() {
            return Err(ToolError::naming(format!(
                "operation id '{operation_id}' contains no alphanumeric characters"
            )));
        }
        Ok(name)
    }
}

/// `<method>_<path>` with separators folded to underscores.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointNaming;

impl NamingStrategy for EndpointNaming {
    fn name(&self, operation: &OperationDescriptor) -> Result<String, ToolError> {
        let method = operation.method.as_str().to_ascii_lowercase();
        let mut name = String::with_capacity(method.len() + operation.path.len() + 1);
        name.push_str(&method);
        name.push('_');

        for (index, character) in operation.path.chars().enumerate() {
            match character {
                '/' if index == 0 => {}
                '/' | '-' => name.push('_'),
                c if c.is_ascii_alphanumeric() || c == '_' => name.push(c.to_ascii_lowercase()),
                _ => {}
            }
        }
        Ok(name)
    }
}

/// Cuts names produced by another strategy down to `max_length` characters.
pub struct TrimmedNaming {
    inner: Box<dyn NamingStrategy>,
    max_length: usize,
}

impl TrimmedNaming {
    pub fn new(inner: Box<dyn NamingStrategy>, max_length: usize) -> Result<Self, ToolError> {
        if max_length == 0 {
            return Err(ToolError::naming("maximum tool name length must be positive"));
        }
        Ok(Self { inner, max_length })
    }
}

impl NamingStrategy for TrimmedNaming {
    fn name(&self, operation: &OperationDescriptor) -> Result<String, ToolError> {
        let name = self.inner.name(operation)?;
        Ok(name.chars().take(self.max_length).collect())
    }
}

fn require_operation_id(operation: &OperationDescriptor) -> Result<&str, ToolError> {
    operation.operation_id.as_deref().ok_or_else(|| {
        ToolError::naming(format!(
            "{} {} has no operation id",
            operation.method, operation.path
        ))
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategyKind {
    OperationId,
    #[default]
    SanitizedOperationId,
    Endpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamingConfig {
    pub strategy: NamingStrategyKind,
    pub max_length: Option<usize>,
}

impl NamingConfig {
    pub fn new(strategy: NamingStrategyKind) -> Self {
        Self {
            strategy,
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Builds the configured strategy, wrapped in [`TrimmedNaming`] when a limit is set.
    pub fn strategy(&self) -> Result<Box<dyn NamingStrategy>, ToolError> {
        let base: Box<dyn NamingStrategy> = match self.strategy {
            NamingStrategyKind::OperationId => Box::new(OperationIdNaming),
            NamingStrategyKind::SanitizedOperationId => Box::new(SanitizedOperationIdNaming),
            NamingStrategyKind::Endpoint => Box::new(EndpointNaming),
        };
        match self.max_length {
            Some(max_length) => Ok(Box::new(TrimmedNaming::new(base, max_length)?)),
            None => Ok(base),
        }
    }
}
