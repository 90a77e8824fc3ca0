//! Metrics-based observability hooks for dispatch, tool runtime, and reload phases.
//!
//! ```rust
//! use odispatch::DispatchHooks;
//! use oobserve::MetricsObservabilityHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use ocommon::RequestContext;
use odispatch::{DispatchHooks, TransportError};
use otooling::{ReloadHooks, ReloadStatus, ToolCall, ToolError, ToolResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl DispatchHooks for MetricsObservabilityHooks {
    fn on_attempt_complete(&self, operation: &str, _attempt: u32, status: u16, elapsed: Duration) {
        metrics::counter!(
            "opentool_api_calls_total",
            "operation" => operation.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "opentool_api_call_duration_seconds",
            "operation" => operation.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_transport_failure(&self, operation: &str, _attempt: u32, error: &TransportError) {
        metrics::counter!(
            "opentool_api_calls_total",
            "operation" => operation.to_string(),
            "status" => "transport_failure"
        )
        .increment(1);
        metrics::counter!(
            "opentool_api_transport_failures_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_correction_retry(&self, operation: &str) {
        metrics::counter!(
            "opentool_double_serialization_retries_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &RequestContext) {
        metrics::counter!(
            "opentool_tool_calls_started_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &RequestContext,
        result: &ToolResult,
        elapsed: Duration,
    ) {
        let outcome = if result.is_error { "error_result" } else { "success" };
        metrics::counter!(
            "opentool_tool_calls_total",
            "tool_name" => tool_call.name.clone(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!(
            "opentool_tool_call_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "outcome" => outcome
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &RequestContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "opentool_tool_calls_total",
            "tool_name" => tool_call.name.clone(),
            "outcome" => "failure",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "opentool_tool_call_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "outcome" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ReloadHooks for MetricsObservabilityHooks {
    fn on_reload_complete(&self, status: ReloadStatus, attempts: u32, elapsed: Duration) {
        metrics::counter!(
            "opentool_live_reload_executions_total",
            "status" => status.as_str()
        )
        .increment(1);
        metrics::histogram!("opentool_live_reload_attempts", "status" => status.as_str())
            .record(attempts as f64);
        metrics::histogram!(
            "opentool_live_reload_duration_seconds",
            "status" => status.as_str()
        )
        .record(elapsed.as_secs_f64());
    }
}
