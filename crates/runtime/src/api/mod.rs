//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on scheduling, workers, or infrastructure.

pub mod errors;
pub mod facades;
pub mod handle;

pub use errors::{FacadeKind, JoinError, Result, RuntimeError};
pub use facades::{
    FacadeError, FarmingFacade, HarvestFlags, HarvestOutcome, HarvestRequest, ItemStack,
    PlayerDirectory, PresentationFacade, ResourceHandle, SessionMode, WorkerEntitySpec,
};
pub use handle::RuntimeHandle;
