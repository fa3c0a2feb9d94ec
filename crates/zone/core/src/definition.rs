//! Raw zone catalog entries.
//!
//! A [`ZoneDefinition`] mirrors one `[zones.<id>]` table of the catalog file.
//! Every field has a default, so a partially written entry still deserializes;
//! semantic checks happen in [`crate::Zone::from_definition`].

use crate::zone::ZoneFlags;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoneDefinition {
    /// Table key in the catalog; filled in by the loader.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub id: String,
    pub display_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub min_corner: Option<String>,
    pub max_corner: Option<String>,
    pub center_location: Option<String>,
    pub resource: String,
    pub allowed_tools: Vec<String>,
    /// Milliseconds between harvests.
    pub harvest_interval: u64,
    /// Milliseconds before a harvested block regenerates.
    pub regeneration_time: u64,
    pub reward_currency: String,
    pub base_reward: f64,
    pub max_workers: usize,
    pub worker_type: String,
    pub integration: IntegrationDefinition,
    pub enabled: bool,
}

impl Default for ZoneDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            display_name: None,
            kind: "CUSTOM".to_owned(),
            min_corner: None,
            max_corner: None,
            center_location: None,
            resource: "STONE".to_owned(),
            allowed_tools: Vec::new(),
            harvest_interval: 5000,
            regeneration_time: 3000,
            reward_currency: "farm-coins".to_owned(),
            base_reward: 100.0,
            max_workers: 5,
            worker_type: "VILLAGER".to_owned(),
            integration: IntegrationDefinition::default(),
            enabled: true,
        }
    }
}

/// Switches controlling how a harvest is reported to the economy facade.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegrationDefinition {
    pub affect_sell: bool,
    pub affect_block_currencies: bool,
    pub affect_lucky_blocks: bool,
    pub use_global_session: bool,
    pub apply_boosters: bool,
    pub grant_experience: bool,
}

impl Default for IntegrationDefinition {
    fn default() -> Self {
        Self {
            affect_sell: true,
            affect_block_currencies: true,
            affect_lucky_blocks: true,
            use_global_session: true,
            apply_boosters: true,
            grant_experience: true,
        }
    }
}

impl IntegrationDefinition {
    pub fn flags(&self) -> ZoneFlags {
        let mut flags = ZoneFlags::empty();
        flags.set(ZoneFlags::AFFECT_SELL, self.affect_sell);
        flags.set(ZoneFlags::AFFECT_BLOCK_CURRENCIES, self.affect_block_currencies);
        flags.set(ZoneFlags::AFFECT_LUCKY_BLOCKS, self.affect_lucky_blocks);
        flags.set(ZoneFlags::USE_GLOBAL_SESSION, self.use_global_session);
        flags.set(ZoneFlags::APPLY_BOOSTERS, self.apply_boosters);
        flags.set(ZoneFlags::GRANT_EXPERIENCE, self.grant_experience);
        flags
    }
}
