//! Builds one [`OpenApiTool`] per document operation.

use std::sync::Arc;

use odispatch::Dispatcher;
use oschema::{OpenApiDocument, OperationDescriptor};

use crate::{
    InputSchemaComposer, NamingConfig, NamingStrategy, OpenApiTool, ToolDefinition, ToolError,
    ToolRegistry, empty_object_schema,
};

pub struct ToolFactory {
    naming: Box<dyn NamingStrategy>,
    composer: Arc<InputSchemaComposer>,
    prepend_summary_to_description: bool,
}

impl ToolFactory {
    pub fn new(naming: Box<dyn NamingStrategy>, composer: InputSchemaComposer) -> Self {
        Self {
            naming,
            composer: Arc::new(composer),
            prepend_summary_to_description: true,
        }
    }

    pub fn from_config(naming: &NamingConfig, composer: InputSchemaComposer) -> Result<Self, ToolError> {
        Ok(Self::new(naming.strategy()?, composer))
    }

    pub fn with_prepend_summary_to_description(mut self, enabled: bool) -> Self {
        self.prepend_summary_to_description = enabled;
        self
    }

    /// Names, composes and registers every operation of an already filtered document.
    ///
    /// Composition allocates into the document's schema graph, so the document must not be
    /// shared while this runs.
    pub fn build(
        &self,
        document: &mut OpenApiDocument,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<ToolRegistry, ToolError> {
        let mut registry = ToolRegistry::new();
        let operations = document.operations.clone();

        for operation in operations {
            let name = self.naming.name(&operation).map_err(|err| {
                ToolError::naming(format!(
                    "cannot name {} {}: {}",
                    operation.method, operation.path, err.message
                ))
            })?;

            let input_schema = self
                .composer
                .compose(&mut document.schemas, &operation, document.version)
                .map(|schema| document.schemas.render(schema))
                .unwrap_or_else(empty_object_schema);
            tracing::debug!(tool = %name, schema = %input_schema, "composed tool input schema");

            let definition = ToolDefinition::new(name.clone(), input_schema)
                .with_title(tool_title(&operation, &name))
                .with_description(tool_description(
                    &operation,
                    self.prepend_summary_to_description,
                ));
            registry.register(OpenApiTool::new(
                definition,
                operation,
                Arc::clone(&self.composer),
                Arc::clone(&dispatcher),
            ))?;
        }

        tracing::info!(
            api = %document.info.title,
            version = %document.info.version,
            tools = registry.len(),
            "built tools from OpenAPI document"
        );
        Ok(registry)
    }
}

/// Summary when it says something, otherwise the tool name.
pub fn tool_title(operation: &OperationDescriptor, name: &str) -> String {
    match non_blank(&operation.summary) {
        Some(summary) => summary.to_string(),
        None => name.to_string(),
    }
}

pub fn tool_description(operation: &OperationDescriptor, prepend_summary: bool) -> String {
    match (non_blank(&operation.summary), non_blank(&operation.description)) {
        (Some(summary), Some(description)) if prepend_summary => {
            format!("# {summary}\n\n{description}")
        }
        (_, Some(description)) => description.to_string(),
        (Some(summary), None) => summary.to_string(),
        (None, None) => String::new(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}
