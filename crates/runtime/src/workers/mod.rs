//! Background tasks that back the runtime orchestration.
//!
//! The tick worker drives the scheduler on a fixed period; harvest metrics are
//! shared between the scheduler's harvest tasks and the runtime handle.

mod metrics;
mod ticker;

pub use metrics::{HarvestMetrics, MetricsSnapshot};
pub use ticker::TickWorker;
