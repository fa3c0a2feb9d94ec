//! Runtime tunables loaded from the settings file.

/// Top-level settings consumed by the runtime and the daemon.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Period of the worker tick driver.
    pub tick_interval_ms: u64,
    /// Enables verbose logging.
    pub debug: bool,
    /// Capacity of each event bus topic.
    pub event_buffer_size: usize,
    pub rewards: RewardSettings,
    pub integrations: IntegrationSettings,
}

impl Settings {
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            debug: false,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
            rewards: RewardSettings::default(),
            integrations: IntegrationSettings::default(),
        }
    }
}

/// Global switches for post-harvest reward processing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardSettings {
    pub currency_rewards: bool,
    pub booster_effects: bool,
    pub leveling: bool,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            currency_rewards: true,
            booster_effects: true,
            leveling: true,
        }
    }
}

/// Optional integrations the host may provide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegrationSettings {
    /// Whether a text-expansion (placeholder) integration should be looked for.
    pub text_expansion: bool,
}
