//! Expose the operations of an OpenAPI document as callable tools.
//!
//! This crate is the single dependency for most embedders. It re-exports the
//! workspace crates and wires them together: configuration, document sources,
//! the reloadable tool catalog and the live reload loop.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use opentool::prelude::*;
//!
//! # async fn run() -> Result<(), BridgeError> {
//! let config = BridgeConfig::default().with_open_api_path("openapi.yaml");
//! let source = config.document_source()?;
//! let transport = Arc::new(ReqwestTransport::with_timeouts(
//!     config.connect_timeout(),
//!     config.read_timeout(),
//! )?);
//!
//! let provider = OpenApiProvider::load(config, source, transport, BridgeHooks::tracing()).await?;
//! for definition in provider.definitions() {
//!     println!("{}: {}", definition.name, definition.title);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod hooks;
mod live_reload;
mod provider;
mod source;

pub mod prelude;

pub use ocommon;
pub use odispatch;
pub use oobserve;
pub use oschema;
pub use otooling;

pub use config::{
    BridgeConfig, DEFAULT_RELOAD_INTERVAL_SECS, DEFAULT_RELOAD_MAX_RETRIES, DEFAULT_TIMEOUT_MS,
    DEFAULT_USER_AGENT, LiveReloadConfig, ToolsConfig,
};
pub use error::{BridgeError, BridgeErrorKind};
pub use hooks::BridgeHooks;
pub use live_reload::{DEFAULT_RETRY_PAUSE, LiveReload, spawn_live_reload};
pub use provider::{OpenApiProvider, ReloadOutcome, ToolCatalog, resolve_base_url};
#[cfg(feature = "http-transport")]
pub use source::UrlSource;
pub use source::{DocumentSource, FileSource, SourceFuture, StaticSource};

pub use ocommon::{BoxFuture, HeaderList, RequestContext, SessionId, TraceId};
#[cfg(feature = "http-transport")]
pub use odispatch::ReqwestTransport;
pub use odispatch::{
    DispatchHooks, Dispatcher, HttpRequest, HttpResponse, HttpTransport, TransportError,
    TransportErrorKind,
};
pub use oschema::{OpenApiDocument, OperationDescriptor, SchemaError, SchemaErrorKind};
pub use otooling::{
    DefaultToolRuntime, NamingConfig, NamingStrategyKind, ReloadHooks, ReloadStatus, SchemaConfig,
    Tool, ToolCall, ToolCallFilter, ToolDefinition, ToolError, ToolErrorKind, ToolRegistry,
    ToolResult, ToolRuntime, ToolRuntimeHooks,
};
