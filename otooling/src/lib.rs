//! Tools built from OpenAPI operations: input schemas, naming, registry and execution.

mod args;
mod composer;
mod error;
mod factory;
mod filter;
mod hooks;
mod naming;
mod registry;
mod runtime;
#[cfg(test)]
mod test_support;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, InputSchemaComposer, NamingConfig, NamingStrategy,
        NamingStrategyKind, Next, OpenApiTool, ReloadHooks, ReloadStatus, SchemaConfig, Tool,
        ToolCall, ToolCallFilter, ToolDefinition, ToolError, ToolErrorKind, ToolFactory,
        ToolFuture, ToolRegistry, ToolResult, ToolResultMocker, ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::parse_arguments;
pub use composer::{
    DEFAULT_BODY_KEY, DEFAULT_PARAMS_KEY, InputSchemaComposer, SchemaConfig, json_body_schema,
};
pub use error::{ToolError, ToolErrorKind};
pub use factory::{ToolFactory, tool_description, tool_title};
pub use filter::{MISSING_EXAMPLE_MESSAGE, Next, ToolCallFilter, ToolResultMocker};
pub use hooks::{
    NoopReloadHooks, NoopToolRuntimeHooks, ReloadHooks, ReloadStatus, ToolRuntimeHooks,
};
pub use naming::{
    EndpointNaming, NamingConfig, NamingStrategy, NamingStrategyKind, OperationIdNaming,
    SanitizedOperationIdNaming, TrimmedNaming,
};
pub use odispatch::ToolResult;
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{OpenApiTool, Tool, ToolFuture};
pub use types::{ToolCall, ToolDefinition, empty_object_schema};
