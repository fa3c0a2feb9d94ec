//! Configuration errors raised while validating zone definitions.
//!
//! Every variant describes a single bad catalog entry. Loading continues with
//! the remaining entries; the offending one is skipped.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ZoneConfigError {
    #[error("zone id must not be empty")]
    EmptyId,

    #[error("malformed location '{value}' (expected world:x:y:z)")]
    MalformedLocation { value: String },

    #[error("zone '{zone}' has a zero harvest interval")]
    ZeroHarvestInterval { zone: String },

    #[error("zone '{zone}' has an invalid base reward {value}")]
    InvalidBaseReward { zone: String, value: f64 },
}
