//! Data-driven zone content and loaders.
//!
//! Reads the zone catalog (TOML or RON) and the runtime settings file (TOML)
//! into `zone-core` types. Catalog loading is tolerant per entry: a malformed
//! zone table is reported in [`ZoneCatalog::rejected`] and the rest still load.
//!
//! Content is consumed by the runtime's zone registry and never mutated there.

pub mod loaders;

pub use loaders::{RejectedEntry, SettingsLoader, ZoneCatalog, ZoneLoader};
