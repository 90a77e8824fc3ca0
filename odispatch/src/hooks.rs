//! Dispatch lifecycle hooks.
//!
//! ```rust
//! use odispatch::{DispatchHooks, NoopDispatchHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = NoopDispatchHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use crate::TransportError;

pub trait DispatchHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_attempt_complete(&self, _operation: &str, _attempt: u32, _status: u16, _elapsed: Duration) {}

    fn on_transport_failure(&self, _operation: &str, _attempt: u32, _error: &TransportError) {}

    fn on_correction_retry(&self, _operation: &str) {}

    fn on_dispatch_complete(&self, _operation: &str, _is_error: bool, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
