//! Common imports for most bridge embedders.

pub use crate::{
    BridgeConfig, BridgeError, BridgeErrorKind, BridgeHooks, DocumentSource, FileSource,
    LiveReload, LiveReloadConfig, OpenApiProvider, ReloadOutcome, StaticSource, ToolCatalog,
    ToolsConfig, spawn_live_reload,
};
#[cfg(feature = "http-transport")]
pub use crate::{ReqwestTransport, UrlSource};
pub use crate::{
    HttpTransport, RequestContext, ToolCall, ToolDefinition, ToolError, ToolResult, ToolRuntime,
};
