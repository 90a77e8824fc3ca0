//! Tool trait contract and the OpenAPI-backed implementation.

use std::sync::Arc;

use ocommon::{BoxFuture, RequestContext};
use odispatch::{Dispatcher, ToolResult};
use oschema::OperationDescriptor;
use serde_json::Value;

use crate::{InputSchemaComposer, ToolDefinition, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// The OpenAPI operation behind the tool, for filters that answer without calling it.
    fn operation(&self) -> Option<&OperationDescriptor> {
        None
    }

    fn invoke<'a>(
        &'a self,
        arguments: Value,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>>;
}

/// A tool backed by one OpenAPI operation: decompose the arguments, then dispatch.
pub struct OpenApiTool {
    definition: ToolDefinition,
    operation: OperationDescriptor,
    composer: Arc<InputSchemaComposer>,
    dispatcher: Arc<Dispatcher>,
}

impl OpenApiTool {
    pub fn new(
        definition: ToolDefinition,
        operation: OperationDescriptor,
        composer: Arc<InputSchemaComposer>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            definition,
            operation,
            composer,
            dispatcher,
        }
    }
}

impl Tool for OpenApiTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn operation(&self) -> Option<&OperationDescriptor> {
        Some(&self.operation)
    }

    fn invoke<'a>(
        &'a self,
        arguments: Value,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            let data = self.composer.decompose(&arguments, &self.operation);
            Ok(self.dispatcher.handle(&self.operation, data, context).await)
        })
    }
}
