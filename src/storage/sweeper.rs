//! TTL Sweeper
//!
//! Background task that periodically removes expired keys.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::store::Shared;

/// Background TTL sweep task
pub(crate) struct Sweeper {
    shared: Weak<Shared>,
    interval: Duration,
}

/// Why a sweeper loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    Cancelled,
    StoreDropped,
}

/// Owner side of a running sweeper; cancels it when dropped
#[derive(Debug)]
pub(crate) struct SweeperHandle {
    cancel: CancellationToken,
    thread: thread::JoinHandle<()>,
}

impl SweeperHandle {
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Sweeper {
    pub(crate) fn new(shared: Weak<Shared>, interval: Duration) -> Self {
        Self { shared, interval }
    }

    /// Run the sweeper until cancelled or the store is gone
    pub(crate) async fn run(self, cancel: CancellationToken) -> StopReason {
        self.run_with(cancel, Shared::sweep_expired).await
    }

    /// Tick loop around `pass`. A panicking pass is logged and the loop
    /// carries on with the next tick.
    async fn run_with<F>(self, cancel: CancellationToken, pass: F) -> StopReason
    where
        F: Fn(&Shared) -> usize,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "TTL sweeper started");

        let reason = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = ticker.tick() => {}
            }

            let Some(shared) = self.shared.upgrade() else {
                break StopReason::StoreDropped;
            };

            match panic::catch_unwind(AssertUnwindSafe(|| pass(&shared))) {
                Ok(0) => {}
                Ok(removed) => debug!(removed = removed, "Swept expired keys"),
                Err(_) => error!("Sweep pass panicked, continuing"),
            }
        };

        info!(reason = ?reason, "TTL sweeper stopped");
        reason
    }

    /// Spawn the sweeper on a named thread driving its own current-thread
    /// runtime, so it lives exactly as long as the store and never depends on
    /// the caller's runtime or its timer. Returns None if the thread cannot
    /// be started; reads still honour expiry in that case.
    pub(crate) fn spawn(shared: Weak<Shared>, interval: Duration) -> Option<SweeperHandle> {
        let runtime = match Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Could not build sweeper runtime, sweeping disabled");
                return None;
            }
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sweeper = Self::new(shared, interval);

        let spawned = thread::Builder::new()
            .name("tidecache-sweeper".to_string())
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(sweeper.run(token))));
                if outcome.is_err() {
                    error!("TTL sweeper terminated abnormally, expired keys are no longer swept");
                }
            });

        match spawned {
            Ok(thread) => Some(SweeperHandle { cancel, thread }),
            Err(e) => {
                warn!(error = %e, "Could not start sweeper thread, sweeping disabled");
                None
            }
        }
    }
}
