//! Validated zone definitions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bitflags::bitflags;
use strum::EnumString;

use crate::definition::ZoneDefinition;
use crate::error::ZoneConfigError;
use crate::geometry::{BlockPos, Geofence, Location};
use crate::ids::{ToolId, ZoneId};
use crate::tools::is_tool_allowed;

/// What a zone harvests. Drives the experience multiplier and level track.
///
/// Parsing is case-insensitive and never fails: unknown labels are preserved
/// as [`ZoneKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ZoneKind {
    Mining,
    Farming,
    Custom,
    #[strum(default)]
    Other(String),
}

impl ZoneKind {
    /// Leveling track credited with experience from this zone.
    pub fn level_track(&self) -> &'static str {
        match self {
            ZoneKind::Mining => "mining-level",
            _ => "farming-level",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::Mining => f.write_str("MINING"),
            ZoneKind::Farming => f.write_str("FARMING"),
            ZoneKind::Custom => f.write_str("CUSTOM"),
            ZoneKind::Other(label) => f.write_str(label),
        }
    }
}

bitflags! {
    /// Per-zone policy switches forwarded to the farming facade or used by
    /// reward processing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ZoneFlags: u8 {
        const AFFECT_SELL = 1 << 0;
        const AFFECT_BLOCK_CURRENCIES = 1 << 1;
        const AFFECT_LUCKY_BLOCKS = 1 << 2;
        const USE_GLOBAL_SESSION = 1 << 3;
        const APPLY_BOOSTERS = 1 << 4;
        const GRANT_EXPERIENCE = 1 << 5;
    }
}

impl Default for ZoneFlags {
    fn default() -> Self {
        ZoneFlags::all()
    }
}

/// A configured harvesting zone. Immutable once loaded; replaced wholesale on reload.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub display_name: String,
    pub kind: ZoneKind,
    /// `None` when a corner is missing or the corners disagree on the world.
    pub geofence: Option<Geofence>,
    /// Interaction anchor (the clickable center block).
    pub anchor: Option<Location>,
    pub resource: String,
    pub harvest_interval_ms: u64,
    pub regeneration_time_ms: u64,
    pub max_workers: usize,
    pub worker_type: String,
    pub reward_currency: String,
    pub base_reward: f64,
    pub flags: ZoneFlags,
    /// Empty means unrestricted.
    pub allowed_tools: Vec<ToolId>,
    pub enabled: bool,
}

impl Zone {
    /// Validates a raw catalog entry.
    pub fn from_definition(def: ZoneDefinition) -> Result<Self, ZoneConfigError> {
        let id = def.id.trim();
        if id.is_empty() {
            return Err(ZoneConfigError::EmptyId);
        }
        if def.harvest_interval == 0 {
            return Err(ZoneConfigError::ZeroHarvestInterval { zone: id.to_owned() });
        }
        if !def.base_reward.is_finite() || def.base_reward < 0.0 {
            return Err(ZoneConfigError::InvalidBaseReward {
                zone: id.to_owned(),
                value: def.base_reward,
            });
        }

        let parse = |raw: &Option<String>| -> Result<Option<Location>, ZoneConfigError> {
            raw.as_deref().map(Location::from_str).transpose()
        };
        let min_corner = parse(&def.min_corner)?;
        let max_corner = parse(&def.max_corner)?;
        let anchor = parse(&def.center_location)?;

        let geofence = match (&min_corner, &max_corner) {
            (Some(a), Some(b)) => Geofence::from_corners(a, b),
            _ => None,
        };

        let kind = ZoneKind::from_str(def.kind.trim())
            .unwrap_or_else(|_| ZoneKind::Other(def.kind.clone()));

        Ok(Self {
            id: ZoneId::new(id),
            display_name: def.display_name.unwrap_or_else(|| id.to_owned()),
            kind,
            geofence,
            anchor,
            resource: def.resource,
            harvest_interval_ms: def.harvest_interval,
            regeneration_time_ms: def.regeneration_time,
            max_workers: def.max_workers,
            worker_type: def.worker_type,
            reward_currency: def.reward_currency,
            base_reward: def.base_reward,
            flags: def.integration.flags(),
            allowed_tools: def.allowed_tools.into_iter().map(ToolId).collect(),
            enabled: def.enabled,
        })
    }

    pub fn harvest_interval(&self) -> Duration {
        Duration::from_millis(self.harvest_interval_ms)
    }

    /// Inclusive geofence test. False when the geofence is unset or the worlds differ.
    pub fn contains_location(&self, point: &Location) -> bool {
        self.geofence
            .as_ref()
            .is_some_and(|fence| fence.contains(point))
    }

    /// Exact block match against the interaction anchor.
    pub fn is_anchor(&self, block: &BlockPos) -> bool {
        self.anchor
            .as_ref()
            .is_some_and(|anchor| anchor.block() == *block)
    }

    pub fn is_tool_allowed(&self, tool: Option<&ToolId>) -> bool {
        is_tool_allowed(tool, self)
    }

    /// Position handed to the farming facade when it has no better target:
    /// the anchor, else the geofence center.
    pub fn fallback_target(&self) -> Option<BlockPos> {
        self.anchor
            .clone()
            .or_else(|| self.geofence.as_ref().map(Geofence::center))
            .map(|loc| loc.block())
    }

    pub fn affects_sell(&self) -> bool {
        self.flags.contains(ZoneFlags::AFFECT_SELL)
    }

    pub fn affects_block_currencies(&self) -> bool {
        self.flags.contains(ZoneFlags::AFFECT_BLOCK_CURRENCIES)
    }

    pub fn affects_lucky_blocks(&self) -> bool {
        self.flags.contains(ZoneFlags::AFFECT_LUCKY_BLOCKS)
    }

    pub fn uses_global_session(&self) -> bool {
        self.flags.contains(ZoneFlags::USE_GLOBAL_SESSION)
    }

    pub fn applies_boosters(&self) -> bool {
        self.flags.contains(ZoneFlags::APPLY_BOOSTERS)
    }

    pub fn grants_experience(&self) -> bool {
        self.flags.contains(ZoneFlags::GRANT_EXPERIENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::IntegrationDefinition;

    fn definition(id: &str) -> ZoneDefinition {
        ZoneDefinition {
            id: id.to_owned(),
            min_corner: Some("world:0:60:0".to_owned()),
            max_corner: Some("world:20:80:20".to_owned()),
            center_location: Some("world:10:64:10".to_owned()),
            ..ZoneDefinition::default()
        }
    }

    #[test]
    fn applies_catalog_defaults() {
        let zone = Zone::from_definition(definition("quarry")).unwrap();

        assert_eq!(zone.display_name, "quarry");
        assert_eq!(zone.kind, ZoneKind::Custom);
        assert_eq!(zone.harvest_interval_ms, 5000);
        assert_eq!(zone.max_workers, 5);
        assert_eq!(zone.flags, ZoneFlags::all());
        assert!(zone.enabled);
        assert!(zone.geofence.is_some());
    }

    #[test]
    fn kind_parsing_is_case_insensitive_and_total() {
        assert_eq!(ZoneKind::from_str("mining").unwrap(), ZoneKind::Mining);
        assert_eq!(ZoneKind::from_str("Farming").unwrap(), ZoneKind::Farming);
        assert_eq!(
            ZoneKind::from_str("FISHING").unwrap(),
            ZoneKind::Other("FISHING".to_owned())
        );
    }

    #[test]
    fn rejects_zero_interval_and_bad_reward() {
        let mut def = definition("quarry");
        def.harvest_interval = 0;
        assert!(matches!(
            Zone::from_definition(def),
            Err(ZoneConfigError::ZeroHarvestInterval { .. })
        ));

        let mut def = definition("quarry");
        def.base_reward = -1.0;
        assert!(matches!(
            Zone::from_definition(def),
            Err(ZoneConfigError::InvalidBaseReward { .. })
        ));
    }

    #[test]
    fn rejects_malformed_corner() {
        let mut def = definition("quarry");
        def.max_corner = Some("world:20:80".to_owned());
        assert!(matches!(
            Zone::from_definition(def),
            Err(ZoneConfigError::MalformedLocation { .. })
        ));
    }

    #[test]
    fn missing_corner_loads_without_geofence() {
        let mut def = definition("quarry");
        def.max_corner = None;
        let zone = Zone::from_definition(def).unwrap();

        assert!(zone.geofence.is_none());
        assert!(!zone.contains_location(&Location::new("world", 5.0, 65.0, 5.0)));
    }

    #[test]
    fn cross_world_corners_never_contain() {
        let mut def = definition("quarry");
        def.max_corner = Some("world_nether:20:80:20".to_owned());
        let zone = Zone::from_definition(def).unwrap();

        assert!(!zone.contains_location(&Location::new("world", 5.0, 65.0, 5.0)));
        assert!(!zone.contains_location(&Location::new("world_nether", 5.0, 65.0, 5.0)));
    }

    #[test]
    fn anchor_matches_block_not_exact_coordinates() {
        let zone = Zone::from_definition(definition("quarry")).unwrap();

        assert!(zone.is_anchor(&BlockPos::new("world", 10, 64, 10)));
        assert!(!zone.is_anchor(&BlockPos::new("world", 10, 65, 10)));
        assert!(!zone.is_anchor(&BlockPos::new("world_nether", 10, 64, 10)));
    }

    #[test]
    fn integration_switches_map_to_flags() {
        let mut def = definition("quarry");
        def.integration = IntegrationDefinition {
            affect_sell: false,
            grant_experience: false,
            ..IntegrationDefinition::default()
        };
        let zone = Zone::from_definition(def).unwrap();

        assert!(!zone.affects_sell());
        assert!(!zone.grants_experience());
        assert!(zone.affects_block_currencies());
        assert!(zone.applies_boosters());
    }

    #[test]
    fn fallback_target_prefers_anchor() {
        let zone = Zone::from_definition(definition("quarry")).unwrap();
        assert_eq!(zone.fallback_target(), Some(BlockPos::new("world", 10, 64, 10)));

        let mut def = definition("quarry");
        def.center_location = None;
        let zone = Zone::from_definition(def).unwrap();
        assert_eq!(zone.fallback_target(), Some(BlockPos::new("world", 10, 70, 10)));
    }
}
