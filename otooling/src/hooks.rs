//! Runtime hooks for tool execution lifecycle events.
//!
//! ```rust
//! use otooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use ocommon::RequestContext;
use odispatch::ToolResult;

use crate::{ToolCall, ToolError};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &RequestContext) {}

    /// Called for every result the tool produced, including upstream error results.
    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &RequestContext,
        _result: &ToolResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &RequestContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}

/// How one live-reload tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadStatus {
    SuccessToolsUpdated,
    SuccessNoChange,
    Failure,
}

impl ReloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuccessToolsUpdated => "success_tools_updated",
            Self::SuccessNoChange => "success_no_change",
            Self::Failure => "failure",
        }
    }
}

/// Observes document reloads; `attempts` counts every try made during the tick.
pub trait ReloadHooks: Send + Sync {
    fn on_reload_complete(&self, _status: ReloadStatus, _attempts: u32, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReloadHooks;

impl ReloadHooks for NoopReloadHooks {}
