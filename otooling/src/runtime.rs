//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::Instant;

use ocommon::RequestContext;
use odispatch::ToolResult;

use crate::{
    Next, NoopToolRuntimeHooks, ToolCall, ToolCallFilter, ToolError, ToolFuture, ToolRegistry,
    ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    filters: Arc<[Arc<dyn ToolCallFilter>]>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            filters: Arc::from(Vec::new()),
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    /// Installs the filter chain, ordered once by [`ToolCallFilter::order`].
    pub fn with_filters(mut self, mut filters: Vec<Arc<dyn ToolCallFilter>>) -> Self {
        filters.sort_by_key(|filter| filter.order());
        self.filters = Arc::from(filters);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, context);
            let started = Instant::now();

            let Some(tool) = self.registry.get(&tool_call.name) else {
                let error = ToolError::not_found(format!("tool '{}' is not registered", tool_call.name))
                    .with_tool_name(tool_call.name.clone())
                    .with_tool_call_id(tool_call.id.clone());
                self.hooks
                    .on_execution_failure(&tool_call, context, &error, started.elapsed());
                return Err(error);
            };

            let outcome = Next::new(&self.filters, tool.as_ref())
                .run(tool_call.clone(), context)
                .await;

            match outcome {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, context, &result, started.elapsed());
                    Ok(result)
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks
                        .on_execution_failure(&tool_call, context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;
    use crate::test_support::StubTool;

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(StubTool::echo("echo"))
            .expect("echo should register");
        registry
            .register(StubTool::failing("broken", ToolError::execution("tool exploded")))
            .expect("broken should register");
        registry
    }

    struct Tagging {
        tag: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ToolCallFilter for Tagging {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn order(&self) -> i32 {
            self.order
        }

        fn call<'a>(
            &'a self,
            mut call: ToolCall,
            context: &'a RequestContext,
            next: Next<'a>,
        ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
            Box::pin(async move {
                self.log.lock().expect("log lock").push(self.tag.to_string());
                if let Some(arguments) = call.arguments.as_object_mut() {
                    arguments.insert(self.tag.to_string(), json!(true));
                }
                next.run(call, context).await
            })
        }
    }

    struct ShortCircuit;

    impl ToolCallFilter for ShortCircuit {
        fn name(&self) -> &'static str {
            "ShortCircuit"
        }

        fn call<'a>(
            &'a self,
            _call: ToolCall,
            _context: &'a RequestContext,
            _next: Next<'a>,
        ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
            Box::pin(async { Ok(ToolResult::error("blocked")) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &RequestContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &RequestContext,
            result: &ToolResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}:{}", tool_call.name, result.is_error));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &RequestContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let runtime = DefaultToolRuntime::new(Arc::new(echo_registry()));

        let result = runtime
            .execute(
                ToolCall::new("call_1", "echo", json!({"q": 1})),
                &RequestContext::new().with_session_id("session-1"),
            )
            .await
            .expect("execution should succeed");

        assert_eq!(result, ToolResult::success(r#"session=session-1 args={"q":1}"#));
    }

    #[tokio::test]
    async fn filters_run_in_order_before_the_tool() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let filter = |tag: &'static str, order: i32| -> Arc<dyn ToolCallFilter> {
            Arc::new(Tagging {
                tag,
                order,
                log: Arc::clone(&log),
            })
        };
        let runtime = DefaultToolRuntime::new(Arc::new(echo_registry()))
            .with_filters(vec![filter("late", 10), filter("early", -5)]);

        let result = runtime
            .execute(ToolCall::new("call_2", "echo", json!({})), &RequestContext::new())
            .await
            .expect("execution should succeed");

        assert_eq!(runtime.filter_names(), vec!["early", "late"]);
        assert_eq!(*log.lock().expect("log lock"), vec!["early", "late"]);
        assert_eq!(result.content, r#"session= args={"early":true,"late":true}"#);
    }

    #[tokio::test]
    async fn a_filter_may_answer_without_calling_the_tool() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(echo_registry()))
            .with_filters(vec![Arc::new(ShortCircuit)])
            .with_hooks(hooks.clone());

        let result = runtime
            .execute(ToolCall::new("call_3", "broken", json!({})), &RequestContext::new())
            .await
            .expect("short circuit should answer");

        assert_eq!(result, ToolResult::error("blocked"));
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec!["start:broken", "success:broken:true"]
        );
    }

    #[tokio::test]
    async fn runtime_reports_unknown_and_failing_tools() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(echo_registry())).with_hooks(hooks.clone());

        let missing = runtime
            .execute(ToolCall::new("call_4", "missing", json!({})), &RequestContext::new())
            .await
            .expect_err("unknown tool should fail");
        assert_eq!(missing.kind, ToolErrorKind::NotFound);
        assert_eq!(missing.tool_call_id.as_deref(), Some("call_4"));

        let broken = runtime
            .execute(ToolCall::new("call_5", "broken", json!({})), &RequestContext::new())
            .await
            .expect_err("broken tool should fail");
        assert_eq!(broken.kind, ToolErrorKind::Execution);
        assert_eq!(broken.message, "tool exploded");

        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec![
                "start:missing",
                "failure:missing:NotFound",
                "start:broken",
                "failure:broken:Execution",
            ]
        );
    }
}
