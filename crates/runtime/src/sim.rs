//! In-process facades for running the scheduler without a host.
//!
//! The daemon uses these to drive demo players; the test suites use them as
//! fixtures. Every knob (failures, delays, stalls, attach behaviour) can be
//! flipped at runtime.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use zone_core::{BlockPos, Location, PlayerId, ToolId, WorkerId, ZoneId};

use crate::api::{
    FacadeError, FarmingFacade, HarvestOutcome, HarvestRequest, ItemStack, PlayerDirectory,
    PresentationFacade, ResourceHandle, SessionMode, WorkerEntitySpec,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Players
// ============================================================================

#[derive(Debug, Clone, Default)]
struct SimPlayer {
    name: String,
    online: bool,
    location: Option<Location>,
    permissions: HashSet<String>,
    main_hand: Option<ItemStack>,
    inventory: Vec<ItemStack>,
}

#[derive(Debug, Default)]
pub struct SimPlayers {
    players: Mutex<HashMap<PlayerId, SimPlayer>>,
}

impl SimPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a player at `location` with no permissions and empty hands.
    pub fn connect(&self, player: PlayerId, name: impl Into<String>, location: Location) {
        lock(&self.players).insert(
            player,
            SimPlayer {
                name: name.into(),
                online: true,
                location: Some(location),
                ..SimPlayer::default()
            },
        );
    }

    pub fn disconnect(&self, player: PlayerId) {
        if let Some(state) = lock(&self.players).get_mut(&player) {
            state.online = false;
        }
    }

    pub fn move_to(&self, player: PlayerId, location: Location) {
        if let Some(state) = lock(&self.players).get_mut(&player) {
            state.location = Some(location);
        }
    }

    pub fn grant(&self, player: PlayerId, permission: &str) {
        if let Some(state) = lock(&self.players).get_mut(&player) {
            state.permissions.insert(permission.to_owned());
        }
    }

    pub fn hold(&self, player: PlayerId, item: Option<ItemStack>) {
        if let Some(state) = lock(&self.players).get_mut(&player) {
            state.main_hand = item;
        }
    }

    pub fn give(&self, player: PlayerId, item: ItemStack) {
        if let Some(state) = lock(&self.players).get_mut(&player) {
            state.inventory.push(item);
        }
    }
}

impl PlayerDirectory for SimPlayers {
    fn is_connected(&self, player: PlayerId) -> bool {
        lock(&self.players)
            .get(&player)
            .is_some_and(|state| state.online)
    }

    fn name(&self, player: PlayerId) -> Option<String> {
        lock(&self.players).get(&player).map(|state| state.name.clone())
    }

    fn location(&self, player: PlayerId) -> Option<Location> {
        lock(&self.players)
            .get(&player)
            .filter(|state| state.online)
            .and_then(|state| state.location.clone())
    }

    fn has_permission(&self, player: PlayerId, permission: &str) -> bool {
        lock(&self.players)
            .get(&player)
            .is_some_and(|state| state.permissions.contains(permission))
    }

    fn main_hand(&self, player: PlayerId) -> Option<ItemStack> {
        lock(&self.players)
            .get(&player)
            .and_then(|state| state.main_hand.clone())
    }

    fn inventory(&self, player: PlayerId) -> Vec<ItemStack> {
        lock(&self.players)
            .get(&player)
            .map(|state| state.inventory.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Farming
// ============================================================================

/// Farming economy stand-in. Tools are items carrying a `tool_tag`.
pub struct SimFarming {
    players: Arc<SimPlayers>,
    sessions: Mutex<HashMap<PlayerId, (ZoneId, SessionMode)>>,
    harvests: Mutex<Vec<HarvestRequest>>,
    experience: Mutex<Vec<(PlayerId, String, f64)>>,
    stalled: Mutex<HashSet<PlayerId>>,
    failing: AtomicBool,
    panicking: AtomicBool,
    join_fails: AtomicBool,
    harvest_delay: Mutex<Duration>,
    booster: Mutex<f64>,
    target: Mutex<Option<BlockPos>>,
}

impl SimFarming {
    pub fn new(players: Arc<SimPlayers>) -> Self {
        Self {
            players,
            sessions: Mutex::new(HashMap::new()),
            harvests: Mutex::new(Vec::new()),
            experience: Mutex::new(Vec::new()),
            stalled: Mutex::new(HashSet::new()),
            failing: AtomicBool::new(false),
            panicking: AtomicBool::new(false),
            join_fails: AtomicBool::new(false),
            harvest_delay: Mutex::new(Duration::ZERO),
            booster: Mutex::new(1.0),
            target: Mutex::new(None),
        }
    }

    /// Makes every subsequent harvest fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every subsequent harvest panic mid-call, as a misbehaving host would.
    pub fn set_panicking(&self, panicking: bool) {
        self.panicking.store(panicking, Ordering::SeqCst);
    }

    pub fn set_join_fails(&self, fails: bool) {
        self.join_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_harvest_delay(&self, delay: Duration) {
        *lock(&self.harvest_delay) = delay;
    }

    /// Harvests for `player` never complete.
    pub fn stall(&self, player: PlayerId) {
        lock(&self.stalled).insert(player);
    }

    pub fn set_booster(&self, multiplier: f64) {
        *lock(&self.booster) = multiplier;
    }

    pub fn set_target(&self, target: Option<BlockPos>) {
        *lock(&self.target) = target;
    }

    pub fn session(&self, player: PlayerId) -> Option<(ZoneId, SessionMode)> {
        lock(&self.sessions).get(&player).cloned()
    }

    /// Every harvest request received, in arrival order.
    pub fn harvests(&self) -> Vec<HarvestRequest> {
        lock(&self.harvests).clone()
    }

    pub fn harvests_for(&self, worker: WorkerId) -> usize {
        lock(&self.harvests)
            .iter()
            .filter(|request| request.worker == worker)
            .count()
    }

    pub fn experience_grants(&self) -> Vec<(PlayerId, String, f64)> {
        lock(&self.experience).clone()
    }
}

#[async_trait]
impl FarmingFacade for SimFarming {
    fn is_player_in_session(&self, player: PlayerId) -> bool {
        lock(&self.sessions).contains_key(&player)
    }

    fn player_zone_id(&self, player: PlayerId) -> Option<ZoneId> {
        lock(&self.sessions).get(&player).map(|(zone, _)| zone.clone())
    }

    async fn join_session(
        &self,
        player: PlayerId,
        zone: &ZoneId,
        mode: SessionMode,
    ) -> Result<(), FacadeError> {
        if self.join_fails.load(Ordering::SeqCst) {
            return Err(FacadeError::Unavailable("session service offline".to_owned()));
        }
        lock(&self.sessions).insert(player, (zone.clone(), mode));
        Ok(())
    }

    async fn leave_session(&self, player: PlayerId) -> Result<(), FacadeError> {
        lock(&self.sessions)
            .remove(&player)
            .map(|_| ())
            .ok_or(FacadeError::NotInSession(player))
    }

    fn resolve_tool_id(&self, player: PlayerId) -> Option<ToolId> {
        self.players
            .main_hand(player)
            .and_then(|item| self.tool_id_of(&item))
    }

    fn tool_id_of(&self, item: &ItemStack) -> Option<ToolId> {
        item.tool_tag.as_deref().map(ToolId::from)
    }

    fn target_position(&self, _player: PlayerId) -> Option<BlockPos> {
        lock(&self.target).clone()
    }

    async fn perform_harvest(&self, request: HarvestRequest) -> Result<HarvestOutcome, FacadeError> {
        let player = request.player;
        lock(&self.harvests).push(request);
        if self.panicking.load(Ordering::SeqCst) {
            panic!("simulated farming facade panic");
        }

        if lock(&self.stalled).contains(&player) {
            std::future::pending::<()>().await;
        }

        let delay = *lock(&self.harvest_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(FacadeError::Call("simulated harvest failure".to_owned()));
        }

        Ok(HarvestOutcome {
            resource: "STONE".to_owned(),
            sold: None,
        })
    }

    async fn booster_multiplier(&self, _player: PlayerId, _currency: &str) -> f64 {
        *lock(&self.booster)
    }

    async fn grant_experience(
        &self,
        player: PlayerId,
        track: &str,
        amount: f64,
    ) -> Result<(), FacadeError> {
        lock(&self.experience).push((player, track.to_owned(), amount));
        Ok(())
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// Presentation stand-in that hands out sequential handles.
#[derive(Debug, Default)]
pub struct SimPresentation {
    next_handle: AtomicU64,
    refuse: AtomicBool,
    attach_delay: Mutex<Duration>,
    spawned: Mutex<Vec<WorkerEntitySpec>>,
    released: Mutex<Vec<u64>>,
}

impl SimPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes entity spawns fail, leaving new workers pending.
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn set_attach_delay(&self, delay: Duration) {
        *lock(&self.attach_delay) = delay;
    }

    pub fn spawned(&self) -> Vec<WorkerEntitySpec> {
        lock(&self.spawned).clone()
    }

    /// Ids of released handles, in release order.
    pub fn released(&self) -> Vec<u64> {
        lock(&self.released).clone()
    }

    pub fn live(&self) -> usize {
        let spawned = self.next_handle.load(Ordering::SeqCst) as usize;
        spawned.saturating_sub(lock(&self.released).len())
    }
}

#[async_trait]
impl PresentationFacade for SimPresentation {
    async fn spawn_worker_entity(
        &self,
        spec: WorkerEntitySpec,
    ) -> Result<ResourceHandle, FacadeError> {
        let delay = *lock(&self.attach_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(FacadeError::Unavailable("entity spawning disabled".to_owned()));
        }

        lock(&self.spawned).push(spec);
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ResourceHandle::new(id))
    }

    fn release(&self, handle: ResourceHandle) {
        lock(&self.released).push(handle.id());
    }
}
