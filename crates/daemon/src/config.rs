//! Daemon configuration read from the process environment.
use std::env;
use std::path::PathBuf;

/// Where the daemon finds its files and how it behaves at startup.
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    pub settings_path: PathBuf,
    pub zones_path: PathBuf,
    /// Overrides `tick_interval_ms` from the settings file.
    pub tick_interval_ms: Option<u64>,
    /// Overrides `debug` from the settings file.
    pub debug: Option<bool>,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Simulated players joined to the first zone at startup.
    pub demo_players: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("config/settings.toml"),
            zones_path: PathBuf::from("config/zones.toml"),
            tick_interval_ms: None,
            debug: None,
            session_id: None,
            log_dir: None,
            demo_players: 0,
        }
    }
}

impl DaemonConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AFKZONE_SETTINGS` - Settings file (default: `config/settings.toml`)
    /// - `AFKZONE_ZONES` - Zone catalog, TOML or RON (default: `config/zones.toml`)
    /// - `AFKZONE_TICK_MS` - Tick period override in milliseconds
    /// - `AFKZONE_DEBUG` - Verbose logging override
    /// - `AFKZONE_SESSION_ID` - Log session name (default: timestamp)
    /// - `AFKZONE_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `AFKZONE_DEMO_PLAYERS` - Simulated players to join at startup (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("AFKZONE_SETTINGS") {
            config.settings_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("AFKZONE_ZONES") {
            config.zones_path = PathBuf::from(path);
        }

        config.tick_interval_ms = read_env::<u64>("AFKZONE_TICK_MS").filter(|ms| *ms > 0);

        if let Some(debug) = read_env::<bool>("AFKZONE_DEBUG") {
            config.debug = Some(debug);
        } else if env::var("AFKZONE_DEBUG").is_ok() {
            // Also accept just setting the variable without value as "true"
            config.debug = Some(true);
        }

        config.session_id = env::var("AFKZONE_SESSION_ID").ok();
        config.log_dir = env::var("AFKZONE_LOG_DIR").ok().map(PathBuf::from);

        if let Some(count) = read_env::<u64>("AFKZONE_DEMO_PLAYERS") {
            config.demo_players = count;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
