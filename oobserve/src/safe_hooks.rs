use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use ocommon::RequestContext;
use odispatch::{DispatchHooks, TransportError};
use otooling::{ReloadHooks, ReloadStatus, ToolCall, ToolError, ToolResult, ToolRuntimeHooks};

pub struct SafeDispatchHooks<H> {
    inner: H,
}

impl<H> SafeDispatchHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> DispatchHooks for SafeDispatchHooks<H>
where
    H: DispatchHooks,
{
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(operation, attempt)
        }));
    }

    fn on_attempt_complete(&self, operation: &str, attempt: u32, status: u16, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_attempt_complete(operation, attempt, status, elapsed)
        }));
    }

    fn on_transport_failure(&self, operation: &str, attempt: u32, error: &TransportError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_transport_failure(operation, attempt, error)
        }));
    }

    fn on_correction_retry(&self, operation: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_correction_retry(operation)));
    }

    fn on_dispatch_complete(&self, operation: &str, is_error: bool, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_complete(operation, is_error, elapsed)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &RequestContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &RequestContext,
        result: &ToolResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &RequestContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeReloadHooks<H> {
    inner: H,
}

impl<H> SafeReloadHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ReloadHooks for SafeReloadHooks<H>
where
    H: ReloadHooks,
{
    fn on_reload_complete(&self, status: ReloadStatus, attempts: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_reload_complete(status, attempts, elapsed)
        }));
    }
}
