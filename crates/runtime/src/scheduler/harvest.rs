//! Harvest task: one external call per dispatch, spawned off the tick path.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};
use zone_core::{PlayerId, Zone, compute_experience, compute_harvest_reward};

use super::WorkerScheduler;
use super::worker::Worker;
use crate::api::{FacadeError, HarvestOutcome, HarvestRequest};
use crate::events::HarvestEvent;
use crate::workers::HarvestMetrics;

/// Currency and experience granted for one harvest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSummary {
    pub reward: Option<f64>,
    pub experience: f64,
}

/// A worker's claimed in-flight slot.
///
/// Dropping it frees the slot, and settles the in-flight metric once the
/// harvest was dispatched. Unwinding out of a facade call drops it too, so a
/// panicking host never wedges the worker.
pub(super) struct HarvestSlot {
    worker: Arc<Worker>,
    metrics: Option<Arc<HarvestMetrics>>,
}

impl HarvestSlot {
    /// Claims the slot and stamps the attempt. `None` when a harvest is
    /// already running.
    pub(super) fn claim(worker: &Arc<Worker>, at: Instant) -> Option<Self> {
        worker.try_begin_harvest(at).then(|| Self {
            worker: Arc::clone(worker),
            metrics: None,
        })
    }

    pub(super) fn worker(&self) -> &Arc<Worker> {
        &self.worker
    }

    pub(super) fn dispatch(&mut self, metrics: &Arc<HarvestMetrics>) {
        metrics.record_dispatch();
        self.metrics = Some(Arc::clone(metrics));
    }

    fn settle(&mut self) {
        if let Some(metrics) = self.metrics.take() {
            metrics.record_settled();
        }
    }
}

impl Drop for HarvestSlot {
    fn drop(&mut self) {
        self.settle();
        self.worker.finish_harvest();
    }
}

impl WorkerScheduler {
    /// Runs one dispatched harvest to completion. The slot is freed when this
    /// returns or unwinds.
    pub(super) async fn run_harvest(
        self: Arc<Self>,
        mut slot: HarvestSlot,
        zone: Arc<Zone>,
        request: HarvestRequest,
    ) {
        let result = self.perform_harvest(&zone, request).await;
        slot.settle();

        let worker = slot.worker();
        match result {
            Ok(outcome) => self.complete_harvest(worker, &zone, outcome).await,
            Err(error) => self.fail_harvest(worker, &error),
        }
    }

    async fn perform_harvest(
        &self,
        zone: &Zone,
        request: HarvestRequest,
    ) -> Result<HarvestOutcome, FacadeError> {
        let farming = &self.facades.farming;
        let player = request.player;

        if !farming.is_player_in_session(player) {
            return Err(FacadeError::NotInSession(player));
        }
        if farming.player_zone_id(player).as_ref() != Some(&zone.id) {
            debug!(
                target: "runtime::harvest",
                player = %player,
                zone = %zone.id,
                "Player session is bound to another zone"
            );
        }

        farming.perform_harvest(request).await
    }

    async fn complete_harvest(&self, worker: &Worker, zone: &Zone, outcome: HarvestOutcome) {
        // Removal wins: a worker removed mid-flight keeps its final state.
        let Some(harvest_count) = worker.record_harvest(Instant::now()) else {
            self.metrics.record_discarded();
            debug!(
                target: "runtime::harvest",
                worker = %worker.id(),
                "Discarding completion for removed worker"
            );
            return;
        };
        self.metrics.record_success();

        let rewards = self.process_rewards(worker.owner(), zone).await;

        debug!(
            target: "runtime::harvest",
            worker = %worker.id(),
            zone = %zone.id,
            harvest_count,
            resource = %outcome.resource,
            reward = ?rewards.reward,
            experience = rewards.experience,
            "Harvest completed"
        );

        self.events.publish(HarvestEvent::Completed {
            worker: worker.id(),
            player: worker.owner(),
            zone: zone.id.clone(),
            harvest_count,
            resource: outcome.resource,
            currency: zone.reward_currency.clone(),
            reward: rewards.reward,
            experience: rewards.experience,
            sold: outcome.sold,
        });
    }

    fn fail_harvest(&self, worker: &Worker, error: &FacadeError) {
        self.metrics.record_failure();
        warn!(
            target: "runtime::harvest",
            worker = %worker.id(),
            player = %worker.owner(),
            zone = %worker.zone_id(),
            error = %error,
            "Harvest failed, retrying after the next interval"
        );

        self.events.publish(HarvestEvent::Failed {
            worker: worker.id(),
            player: worker.owner(),
            zone: worker.zone_id().clone(),
            error: error.to_string(),
        });
    }

    /// Applies the global reward switches and the zone's own flags.
    pub(super) async fn process_rewards(&self, player: PlayerId, zone: &Zone) -> RewardSummary {
        let farming = &self.facades.farming;

        let reward = if self.rewards.currency_rewards {
            let multiplier = if self.rewards.booster_effects && zone.applies_boosters() {
                farming
                    .booster_multiplier(player, &zone.reward_currency)
                    .await
            } else {
                1.0
            };
            Some(compute_harvest_reward(zone.base_reward, multiplier))
        } else {
            None
        };

        let mut experience = 0.0;
        if self.rewards.leveling {
            let amount = compute_experience(zone);
            if amount > 0.0 {
                match farming
                    .grant_experience(player, zone.kind.level_track(), amount)
                    .await
                {
                    Ok(()) => experience = amount,
                    Err(error) => warn!(
                        target: "runtime::harvest",
                        player = %player,
                        zone = %zone.id,
                        error = %error,
                        "Failed to grant experience"
                    ),
                }
            }
        }

        RewardSummary { reward, experience }
    }
}
