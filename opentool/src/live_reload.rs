//! Periodic document refresh with bounded retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use otooling::ReloadStatus;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{LiveReloadConfig, OpenApiProvider};

pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(1);

pub struct LiveReload {
    provider: Arc<OpenApiProvider>,
    max_retries: u32,
    retry_pause: Duration,
    in_progress: AtomicBool,
}

impl LiveReload {
    pub fn new(provider: Arc<OpenApiProvider>, config: &LiveReloadConfig) -> Self {
        Self {
            provider,
            max_retries: config.max_retries.max(1),
            retry_pause: DEFAULT_RETRY_PAUSE,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_retry_pause(mut self, retry_pause: Duration) -> Self {
        self.retry_pause = retry_pause;
        self
    }

    /// One refresh: up to `max_retries` reloads, stopping at the first success.
    ///
    /// Returns `None` without touching the provider when another refresh is still running.
    pub async fn run_once(&self) -> Option<ReloadStatus> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!(phase = "reload", "refresh already in progress, skipping this tick");
            return None;
        }
        let _guard = InProgressGuard(&self.in_progress);

        let started = Instant::now();
        let mut status = ReloadStatus::Failure;
        let mut attempts = 0;
        while attempts < self.max_retries {
            attempts += 1;
            match self.provider.reload().await {
                Ok(outcome) => {
                    status = outcome.status();
                    break;
                }
                Err(err) => {
                    tracing::error!(
                        phase = "reload",
                        attempt = attempts,
                        max_retries = self.max_retries,
                        error = %err,
                        "document refresh failed"
                    );
                    if attempts < self.max_retries {
                        tokio::time::sleep(self.retry_pause).await;
                    }
                }
            }
        }

        if status == ReloadStatus::Failure {
            tracing::warn!(phase = "reload", attempts, "document refresh gave up");
        } else {
            tracing::info!(phase = "reload", status = status.as_str(), "document refreshed");
        }
        self.provider
            .reload_hooks()
            .on_reload_complete(status, attempts, started.elapsed());
        Some(status)
    }
}

struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Spawns the refresh loop, or returns `None` when live reload is disabled.
///
/// The first refresh happens one interval after spawning. Each tick runs on its own
/// task, so a slow refresh makes the following ticks skip rather than queue.
pub fn spawn_live_reload(
    provider: Arc<OpenApiProvider>,
    config: &LiveReloadConfig,
) -> Option<JoinHandle<()>> {
    if !config.enabled {
        return None;
    }

    let period = config.interval();
    if period.is_zero() {
        tracing::warn!(phase = "reload", "live reload interval is zero, not scheduling");
        return None;
    }
    let reload = Arc::new(LiveReload::new(provider, config));
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let reload = Arc::clone(&reload);
            tokio::spawn(async move {
                reload.run_once().await;
            });
        }
    }))
}
