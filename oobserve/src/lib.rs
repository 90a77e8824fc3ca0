//! Production-friendly observability hooks for dispatch, tool, and reload phases.
//!
//! ```rust
//! use oobserve::{MetricsObservabilityHooks, SafeDispatchHooks, TracingObservabilityHooks};
//!
//! let _dispatch_hooks = SafeDispatchHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeDispatchHooks, SafeReloadHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeDispatchHooks, SafeReloadHooks, SafeToolHooks,
        TracingObservabilityHooks,
    };
}
