//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{HarvestEvent, WorkerEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Worker lifecycle (created, activated, removed)
    Worker,
    /// Harvest dispatch and results
    Harvest,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Worker(WorkerEvent),
    Harvest(HarvestEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Worker(_) => Topic::Worker,
            Event::Harvest(_) => Topic::Harvest,
        }
    }
}

impl From<WorkerEvent> for Event {
    fn from(event: WorkerEvent) -> Self {
        Event::Worker(event)
    }
}

impl From<HarvestEvent> for Event {
    fn from(event: HarvestEvent) -> Self {
        Event::Harvest(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. The topic set is fixed, so each topic owns its
/// sender directly and publishing never takes a lock.
#[derive(Clone)]
pub struct EventBus {
    worker: broadcast::Sender<Event>,
    harvest: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            worker: broadcast::channel(capacity).0,
            harvest: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Worker => &self.worker,
            Topic::Harvest => &self.harvest,
        }
    }

    /// Publish an event to its corresponding topic.
    ///
    /// Best-effort: with no subscribers the event is dropped.
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if self.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
