//! In-crate tools for registry and runtime tests.

use ocommon::RequestContext;
use odispatch::ToolResult;
use serde_json::Value;

use crate::{Tool, ToolDefinition, ToolError, ToolFuture, empty_object_schema};

/// Echoes its session and arguments, or fails with a fixed error.
pub(crate) struct StubTool {
    definition: ToolDefinition,
    failure: Option<ToolError>,
}

impl StubTool {
    pub(crate) fn echo(name: &str) -> Self {
        Self {
            definition: ToolDefinition::new(name, empty_object_schema()),
            failure: None,
        }
    }

    pub(crate) fn failing(name: &str, error: ToolError) -> Self {
        Self {
            definition: ToolDefinition::new(name, empty_object_schema()),
            failure: Some(error),
        }
    }
}

impl Tool for StubTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        arguments: Value,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            let session = context
                .session_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            Ok(ToolResult::success(format!("session={session} args={arguments}")))
        })
    }
}
