//! Topic-based event bus for runtime events.
//!
//! Presentation collaborators (entity effects, chat messages, sounds) hang off
//! these topics. The scheduler publishes and never waits on a consumer.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{HarvestEvent, RemovalReason, WorkerEvent};
