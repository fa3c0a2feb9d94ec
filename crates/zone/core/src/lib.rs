//! Pure domain model for automated harvesting zones.
//!
//! This crate defines everything about zones and workers that can be decided
//! without touching the outside world:
//! - identifiers shared across crates ([`ZoneId`], [`PlayerId`], [`WorkerId`], [`ToolId`])
//! - world geometry and geofencing ([`Location`], [`BlockPos`], [`Geofence`])
//! - validated zone definitions ([`Zone`]) built from raw [`ZoneDefinition`]s
//! - reward and experience formulas ([`rewards`])
//! - tool allow-list checks ([`tools`])
//! - runtime tunables ([`Settings`])
//!
//! The runtime crate owns scheduling and external calls; loaders in
//! `zone-content` produce [`ZoneDefinition`]s from data files.

pub mod config;
pub mod definition;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod rewards;
pub mod tools;
pub mod zone;

pub use config::{IntegrationSettings, RewardSettings, Settings};
pub use definition::{IntegrationDefinition, ZoneDefinition};
pub use error::ZoneConfigError;
pub use geometry::{BlockPos, Geofence, Location, WorldId};
pub use ids::{PlayerId, ToolId, WorkerId, ZoneId};
pub use rewards::{compute_experience, compute_harvest_reward, experience_multiplier};
pub use tools::is_tool_allowed;
pub use zone::{Zone, ZoneFlags, ZoneKind};
