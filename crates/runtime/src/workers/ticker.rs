//! Periodic tick driver.
//!
//! Runs [`WorkerScheduler::tick`] on a fixed period until told to stop. A tick
//! only inspects workers and spawns harvest tasks, so it never waits on an
//! external call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::scheduler::WorkerScheduler;

pub struct TickWorker {
    scheduler: Arc<WorkerScheduler>,
    period: Duration,
    shutdown_rx: watch::Receiver<bool>,
}

impl TickWorker {
    pub fn new(
        scheduler: Arc<WorkerScheduler>,
        period: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            scheduler,
            period,
            shutdown_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            target: "runtime::ticker",
            period_ms = self.period.as_millis() as u64,
            "Tick driver started"
        );

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let summary = self.scheduler.tick();
                    if summary.dispatched > 0 || summary.removed > 0 || summary.panicked > 0 {
                        debug!(
                            target: "runtime::ticker",
                            scanned = summary.scanned,
                            dispatched = summary.dispatched,
                            removed = summary.removed,
                            panicked = summary.panicked,
                            "Tick processed"
                        );
                    }
                }
            }
        }

        info!(target: "runtime::ticker", "Tick driver stopped");
    }
}
