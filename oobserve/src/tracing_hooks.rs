//! Tracing-based observability hooks for dispatch, tool runtime, and reload phases.
//!
//! ```rust
//! use oobserve::TracingObservabilityHooks;
//! use otooling::ReloadHooks;
//!
//! fn accepts_reload_hooks(_hooks: &dyn ReloadHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_reload_hooks(&hooks);
//! ```

use std::time::Duration;

use ocommon::RequestContext;
use odispatch::{DispatchHooks, TransportError};
use otooling::{ReloadHooks, ReloadStatus, ToolCall, ToolError, ToolResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl DispatchHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::info!(phase = "dispatch", event = "attempt_start", operation, attempt);
    }

    fn on_attempt_complete(&self, operation: &str, attempt: u32, status: u16, elapsed: Duration) {
        tracing::info!(
            phase = "dispatch",
            event = "attempt_complete",
            operation,
            attempt,
            status,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_transport_failure(&self, operation: &str, attempt: u32, error: &TransportError) {
        tracing::error!(
            phase = "dispatch",
            event = "transport_failure",
            operation,
            attempt,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_correction_retry(&self, operation: &str) {
        tracing::warn!(phase = "dispatch", event = "correction_retry", operation);
    }

    fn on_dispatch_complete(&self, operation: &str, is_error: bool, elapsed: Duration) {
        tracing::info!(
            phase = "dispatch",
            event = "dispatch_complete",
            operation,
            is_error,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &RequestContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name.as_str(),
            tool_call_id = tool_call.id.as_str(),
            session_id = context.session_id.as_ref().map(|id| id.as_str()),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &RequestContext,
        result: &ToolResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name.as_str(),
            tool_call_id = tool_call.id.as_str(),
            session_id = context.session_id.as_ref().map(|id| id.as_str()),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            is_error = result.is_error,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &RequestContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name.as_str(),
            tool_call_id = tool_call.id.as_str(),
            session_id = context.session_id.as_ref().map(|id| id.as_str()),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ReloadHooks for TracingObservabilityHooks {
    fn on_reload_complete(&self, status: ReloadStatus, attempts: u32, elapsed: Duration) {
        match status {
            ReloadStatus::Failure => tracing::error!(
                phase = "reload",
                event = "reload_complete",
                status = status.as_str(),
                attempts,
                elapsed_ms = elapsed.as_millis() as u64
            ),
            _ => tracing::info!(
                phase = "reload",
                event = "reload_complete",
                status = status.as_str(),
                attempts,
                elapsed_ms = elapsed.as_millis() as u64
            ),
        }
    }
}
