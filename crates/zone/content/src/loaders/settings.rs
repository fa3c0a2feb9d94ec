//! Runtime settings loader.

use std::path::Path;

use zone_core::Settings;

use crate::loaders::{LoadResult, read_file};

/// Loader for runtime settings from TOML files.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> LoadResult<Settings> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Settings> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))
    }

    /// Load settings if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> LoadResult<Settings> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Settings::default())
        }
    }
}
