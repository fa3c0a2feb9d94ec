//! Zone catalog loader.
//!
//! # Format
//!
//! TOML:
//! ```toml
//! [zones.quarry]
//! display_name = "Quarry"
//! type = "MINING"
//! min_corner = "world:0:60:0"
//! max_corner = "world:20:80:20"
//! center_location = "world:10:64:10"
//! max_workers = 3
//!
//! [zones.quarry.integration]
//! affect_sell = false
//! ```
//!
//! RON:
//! ```ron
//! (zones: {
//!     "quarry": (type: "MINING", min_corner: Some("world:0:60:0"), max_workers: 3),
//! })
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use zone_core::ZoneDefinition;

use crate::loaders::{LoadResult, read_file};

/// Definitions read from a catalog, plus the entries that could not be decoded.
#[derive(Clone, Debug, Default)]
pub struct ZoneCatalog {
    pub definitions: Vec<ZoneDefinition>,
    pub rejected: Vec<RejectedEntry>,
}

impl ZoneCatalog {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.rejected.is_empty()
    }
}

/// A catalog entry skipped because its table did not decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedEntry {
    pub id: String,
    pub reason: String,
}

#[derive(Deserialize)]
struct RonCatalogFile {
    #[serde(default)]
    zones: BTreeMap<String, ron::Value>,
}

/// Loader for zone catalogs.
pub struct ZoneLoader;

impl ZoneLoader {
    /// Load a catalog, choosing the format from the file extension
    /// (`.ron` for RON, anything else as TOML).
    ///
    /// Fails only when the file cannot be read or is not a valid document at
    /// all; individual bad entries land in [`ZoneCatalog::rejected`].
    pub fn load(path: &Path) -> LoadResult<ZoneCatalog> {
        let content = read_file(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::parse_ron(&content),
            _ => Self::parse_toml(&content),
        }
    }

    pub fn parse_toml(content: &str) -> LoadResult<ZoneCatalog> {
        let document: toml::Table = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse zone catalog TOML: {}", e))?;

        let Some(zones) = document.get("zones") else {
            return Ok(ZoneCatalog::default());
        };
        let zones = zones
            .as_table()
            .ok_or_else(|| anyhow::anyhow!("`zones` must be a table of zone definitions"))?;

        let mut catalog = ZoneCatalog::default();
        for (id, value) in zones {
            match value.clone().try_into::<ZoneDefinition>() {
                Ok(definition) => catalog.definitions.push(with_id(definition, id)),
                Err(e) => catalog.rejected.push(RejectedEntry {
                    id: id.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(catalog)
    }

    pub fn parse_ron(content: &str) -> LoadResult<ZoneCatalog> {
        let file: RonCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse zone catalog RON: {}", e))?;

        let mut catalog = ZoneCatalog::default();
        for (id, value) in file.zones {
            match value.into_rust::<ZoneDefinition>() {
                Ok(definition) => catalog.definitions.push(with_id(definition, &id)),
                Err(e) => catalog.rejected.push(RejectedEntry {
                    id,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(catalog)
    }
}

fn with_id(mut definition: ZoneDefinition, id: &str) -> ZoneDefinition {
    definition.id = id.to_owned();
    definition
}
