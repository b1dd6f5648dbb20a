//! Topic-based event bus implementation.

use std::collections::HashMap;

use progression_core::ProgressionEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{EffectEvent, RosterEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Ledger, skill, class, roster and effect changes
    Progression,
    /// Derived stat recomputations that changed values
    Stats,
    /// Cast successes and failures
    Cast,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Progression, Topic::Stats, Topic::Cast];
}

/// Event wrapper that carries the typed event of one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Progression(ProgressionEvent),
    Roster(RosterEvent),
    Effect(EffectEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Progression(event) if event.is_stats_change() => Topic::Stats,
            Event::Progression(event) if event.is_cast() => Topic::Cast,
            Event::Progression(_) | Event::Roster(_) | Event::Effect(_) => Topic::Progression,
        }
    }
}

impl From<ProgressionEvent> for Event {
    fn from(event: ProgressionEvent) -> Self {
        Event::Progression(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels for every topic exist from construction
/// on, so publishing and subscribing never fail.
#[derive(Clone)]
pub struct EventBus {
    progression: broadcast::Sender<Event>,
    stats: broadcast::Sender<Event>,
    cast: broadcast::Sender<Event>,
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
            progression: broadcast::channel(capacity).0,
            stats: broadcast::channel(capacity).0,
            cast: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Progression => &self.progression,
            Topic::Stats => &self.stats,
            Topic::Cast => &self.cast,
        }
    }

    /// Publish an event to its corresponding topic
    ///
    /// Events are best-effort: without subscribers they are dropped.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("progression_receivers", &self.progression.receiver_count())
            .field("stats_receivers", &self.stats.receiver_count())
            .field("cast_receivers", &self.cast.receiver_count())
            .finish()
    }
}
