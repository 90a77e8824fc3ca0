//! Ordered document filters run between parsing and tool composition.

use std::collections::HashMap;

use crate::{DiscriminatorFlattener, OpenApiDocument, SchemaError, SchemaWalker};

pub trait OpenApiFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, document: &mut OpenApiDocument) -> Result<(), SchemaError>;
}

impl OpenApiFilter for DiscriminatorFlattener {
    fn name(&self) -> &'static str {
        "DiscriminatorFlattener"
    }

    fn apply(&self, document: &mut OpenApiDocument) -> Result<(), SchemaError> {
        self.flatten(document);
        Ok(())
    }
}

/// Drops the `pattern` keyword from every reachable schema.
///
/// Many tool clients reject ECMA-262 patterns that the upstream API happily declares.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternPropertyRemover;

impl OpenApiFilter for PatternPropertyRemover {
    fn name(&self) -> &'static str {
        "PatternPropertyRemover"
    }

    fn apply(&self, document: &mut OpenApiDocument) -> Result<(), SchemaError> {
        SchemaWalker::new().walk_document(document, |graph, id| {
            graph.node_mut(id).extra.remove("pattern");
        });
        Ok(())
    }
}

/// Filters applied in registration order, each one skippable by name.
pub struct FilterChain {
    filters: Vec<Box<dyn OpenApiFilter>>,
    enabled: HashMap<String, bool>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            enabled: HashMap::new(),
        }
    }

    /// Pattern removal first, then discriminator flattening.
    pub fn standard() -> Self {
        Self::new()
            .with_filter(PatternPropertyRemover)
            .with_filter(DiscriminatorFlattener::new())
    }

    pub fn with_filter(mut self, filter: impl OpenApiFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Filters missing from `enabled` stay on.
    pub fn with_enabled(mut self, enabled: HashMap<String, bool>) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.get(name).copied().unwrap_or(true)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    pub fn apply(&self, document: &mut OpenApiDocument) -> Result<(), SchemaError> {
        for filter in &self.filters {
            let name = filter.name();
            if !self.is_enabled(name) {
                tracing::debug!(filter = name, "document filter disabled");
                continue;
            }
            filter.apply(document).map_err(|err| match err.kind {
                crate::SchemaErrorKind::Filter => err,
                _ => SchemaError::filter(name, err.message),
            })?;
        }
        Ok(())
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::standard()
    }
}
