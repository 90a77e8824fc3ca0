//! One bundle for every lifecycle hook the bridge reports to.

use std::sync::Arc;

use odispatch::{DispatchHooks, NoopDispatchHooks};
use oobserve::{
    MetricsObservabilityHooks, SafeDispatchHooks, SafeReloadHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
use otooling::{NoopReloadHooks, NoopToolRuntimeHooks, ReloadHooks, ToolRuntimeHooks};

#[derive(Clone)]
pub struct BridgeHooks {
    pub dispatch: Arc<dyn DispatchHooks>,
    pub tools: Arc<dyn ToolRuntimeHooks>,
    pub reload: Arc<dyn ReloadHooks>,
}

impl Default for BridgeHooks {
    fn default() -> Self {
        Self {
            dispatch: Arc::new(NoopDispatchHooks),
            tools: Arc::new(NoopToolRuntimeHooks),
            reload: Arc::new(NoopReloadHooks),
        }
    }
}

impl BridgeHooks {
    /// Structured `tracing` events, isolated from panics.
    pub fn tracing() -> Self {
        Self {
            dispatch: Arc::new(SafeDispatchHooks::new(TracingObservabilityHooks)),
            tools: Arc::new(SafeToolHooks::new(TracingObservabilityHooks)),
            reload: Arc::new(SafeReloadHooks::new(TracingObservabilityHooks)),
        }
    }

    /// `opentool_*` counters and histograms, isolated from panics.
    pub fn metrics() -> Self {
        Self {
            dispatch: Arc::new(SafeDispatchHooks::new(MetricsObservabilityHooks)),
            tools: Arc::new(SafeToolHooks::new(MetricsObservabilityHooks)),
            reload: Arc::new(SafeReloadHooks::new(MetricsObservabilityHooks)),
        }
    }

    pub fn with_dispatch(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.dispatch = hooks;
        self
    }

    pub fn with_tools(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tools = hooks;
        self
    }

    pub fn with_reload(mut self, hooks: Arc<dyn ReloadHooks>) -> Self {
        self.reload = hooks;
        self
    }
}

impl std::fmt::Debug for BridgeHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHooks").finish_non_exhaustive()
    }
}
