//! Unified error types surfaced by the runtime API.
//!
//! [`RuntimeError`] covers assembling and tearing down the runtime.
//! [`JoinError`] is the only failure a player ever sees: it is returned
//! synchronously from the join gate at the point of request.
use std::fmt;

use thiserror::Error;
use zone_core::ZoneId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} facade not set")]
    FacadeNotSet { kind: FacadeKind },

    #[error("tick driver join failed")]
    TickerJoin(#[source] tokio::task::JoinError),

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
}

/// Synchronous rejections of a join or toggle request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("zone '{zone}' not found")]
    ZoneNotFound { zone: ZoneId },

    #[error("zone '{zone}' is full")]
    ZoneFull { zone: ZoneId },

    #[error("you must be inside zone '{zone}' to join")]
    NotInsideGeofence { zone: ZoneId },

    #[error("zone '{zone}' has invalid boundaries")]
    InvalidGeofence { zone: ZoneId },

    #[error("your tool is not allowed in zone '{zone}'")]
    ToolNotAllowed { zone: ZoneId },

    #[error("missing permission '{permission}'")]
    MissingPermission { permission: &'static str },

    #[error("player is not online")]
    PlayerOffline,
}

/// Which external collaborator a [`RuntimeError::FacadeNotSet`] refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FacadeKind {
    Farming,
    Presentation,
    Players,
}

impl fmt::Display for FacadeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FacadeKind::Farming => "farming",
            FacadeKind::Presentation => "presentation",
            FacadeKind::Players => "players",
        };
        write!(f, "{}", label)
    }
}
