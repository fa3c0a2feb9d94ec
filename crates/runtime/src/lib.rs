//! Runtime orchestration for AFK zone workers.
//!
//! This crate wires together the zone registry, the worker scheduler, the
//! tick driver and the external facades into a cohesive runtime API. Hosts
//! embed [`Runtime`] to schedule harvests, subscribe to events, and route
//! player actions through [`RuntimeHandle`] and its [`JoinGate`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes facades, errors, and the handle downstream clients use
//! - [`zones`] owns the loaded zone set and its spatial lookups
//! - [`scheduler`] owns workers, their indices, and harvest dispatch
//! - [`gate`] enforces join preconditions for player-triggered actions
//! - [`events`] provides topic-based event bus for presentation collaborators
//! - [`capabilities`] negotiates optional integrations at startup
//! - [`sim`] offers in-process facades for demos and tests
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod capabilities;
pub mod events;
pub mod gate;
pub mod runtime;
pub mod scheduler;
pub mod sim;
pub mod zones;

mod workers;

pub use api::{
    FacadeError, FacadeKind, FarmingFacade, HarvestFlags, HarvestOutcome, HarvestRequest,
    ItemStack, JoinError, PlayerDirectory, PresentationFacade, ResourceHandle, Result,
    RuntimeError, RuntimeHandle, SessionMode, WorkerEntitySpec,
};
pub use capabilities::{Capabilities, IntegrationProbe, StaticProbe};
pub use events::{Event, EventBus, HarvestEvent, RemovalReason, Topic, WorkerEvent};
pub use gate::{JoinGate, PERMISSION_CLICK, PERMISSION_USE, ToggleOutcome};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scheduler::{
    Facades, RewardSummary, TickSummary, Worker, WorkerPhase, WorkerScheduler, WorkerSnapshot,
};
pub use workers::{HarvestMetrics, MetricsSnapshot};
pub use zones::{LoadReport, ZoneRegistry};
