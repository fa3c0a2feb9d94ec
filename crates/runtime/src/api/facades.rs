//! Boundaries to the systems the runtime drives but does not own.
//!
//! - [`FarmingFacade`]: the external economy (sessions, tools, the harvest action)
//! - [`PresentationFacade`]: worker entities shown in the world
//! - [`PlayerDirectory`]: presence and per-player state owned by the host
//!
//! Every failure coming back through these traits is recoverable. The
//! scheduler logs it and carries on with other workers.
use async_trait::async_trait;
use thiserror::Error;
use zone_core::{BlockPos, Location, PlayerId, ToolId, WorkerId, Zone, ZoneId};

/// Failure of a single external call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FacadeError {
    #[error("external call returned no result")]
    NoResult,

    #[error("{0} is not in a farming session")]
    NotInSession(PlayerId),

    #[error("external system unavailable: {0}")]
    Unavailable(String),

    #[error("external call failed: {0}")]
    Call(String),
}

/// How a player joins the external farming session for a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionMode {
    /// Shared with everyone farming the zone.
    Global,
    /// Private instance for the player.
    Alone,
}

/// Effects the external system should apply for one harvest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HarvestFlags {
    /// Always false for automated harvests.
    pub affect_enchants: bool,
    pub affect_sell: bool,
    pub affect_block_currencies: bool,
    pub affect_lucky_blocks: bool,
}

impl HarvestFlags {
    /// Flags forwarded for an automated harvest in `zone`.
    pub fn for_zone(zone: &Zone) -> Self {
        Self {
            affect_enchants: false,
            affect_sell: zone.affects_sell(),
            affect_block_currencies: zone.affects_block_currencies(),
            affect_lucky_blocks: zone.affects_lucky_blocks(),
        }
    }
}

/// One harvest delegated to the farming facade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestRequest {
    pub worker: WorkerId,
    pub player: PlayerId,
    pub zone: ZoneId,
    pub position: BlockPos,
    pub tool: ToolId,
    pub flags: HarvestFlags,
}

/// What the external system reports for a successful harvest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestOutcome {
    /// Resource that was mined or farmed.
    pub resource: String,
    /// Sale summary, when the harvest was sold immediately.
    pub sold: Option<String>,
}

/// An item as seen by the host, opaque to the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub material: String,
    /// Identifier tag the farming system stamps on its tools.
    pub tool_tag: Option<String>,
}

impl ItemStack {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            tool_tag: None,
        }
    }

    pub fn tool(material: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            tool_tag: Some(tag.into()),
        }
    }
}

#[async_trait]
pub trait FarmingFacade: Send + Sync {
    fn is_player_in_session(&self, player: PlayerId) -> bool;

    fn player_zone_id(&self, player: PlayerId) -> Option<ZoneId>;

    async fn join_session(
        &self,
        player: PlayerId,
        zone: &ZoneId,
        mode: SessionMode,
    ) -> Result<(), FacadeError>;

    async fn leave_session(&self, player: PlayerId) -> Result<(), FacadeError>;

    /// Tool id of the item in the player's main hand, if it is a recognized tool.
    fn resolve_tool_id(&self, player: PlayerId) -> Option<ToolId>;

    /// Tool id of an arbitrary item, if it is a recognized tool.
    fn tool_id_of(&self, item: &ItemStack) -> Option<ToolId>;

    /// Preferred block to harvest for the player, e.g. the first block loaded
    /// in their session. `None` falls back to the zone's own target.
    fn target_position(&self, _player: PlayerId) -> Option<BlockPos> {
        None
    }

    /// Performs one harvest. May be slow; the runtime never awaits it on the
    /// tick path.
    async fn perform_harvest(&self, request: HarvestRequest) -> Result<HarvestOutcome, FacadeError>;

    async fn booster_multiplier(&self, _player: PlayerId, _currency: &str) -> f64 {
        1.0
    }

    async fn grant_experience(
        &self,
        _player: PlayerId,
        _track: &str,
        _amount: f64,
    ) -> Result<(), FacadeError> {
        Ok(())
    }
}

/// Opaque handle to a presentation resource (the visible worker entity).
///
/// Neither `Clone` nor `Copy`: a worker owns exactly one and
/// gives it back through [`PresentationFacade::release`] exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: u64,
}

impl ResourceHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// What the presentation layer needs to spawn a worker entity.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerEntitySpec {
    pub worker: WorkerId,
    pub owner: PlayerId,
    pub zone: ZoneId,
    pub entity_type: String,
    pub location: Option<Location>,
    pub display_name: String,
}

#[async_trait]
pub trait PresentationFacade: Send + Sync {
    /// Spawns the worker entity. The worker is scheduled only once this resolves.
    async fn spawn_worker_entity(&self, spec: WorkerEntitySpec)
    -> Result<ResourceHandle, FacadeError>;

    fn release(&self, handle: ResourceHandle);
}

/// Host-owned player state.
pub trait PlayerDirectory: Send + Sync {
    fn is_connected(&self, player: PlayerId) -> bool;

    fn name(&self, player: PlayerId) -> Option<String>;

    fn location(&self, player: PlayerId) -> Option<Location>;

    fn has_permission(&self, player: PlayerId, permission: &str) -> bool;

    fn main_hand(&self, player: PlayerId) -> Option<ItemStack>;

    /// Held items in inventory order.
    fn inventory(&self, player: PlayerId) -> Vec<ItemStack>;
}
