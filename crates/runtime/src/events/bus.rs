//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{ResolutionEvent, StepEvent};

/// Topics for event routing
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Topic {
    /// Committed steps
    Step,
    /// Proposals reaching a terminal status
    Resolution,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    StepApplied(StepEvent),
    ProposalResolved(ResolutionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::StepApplied(_) => Topic::Step,
            Event::ProposalResolved(_) => Topic::Resolution,
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            Event::StepApplied(event) => &event.game_id,
            Event::ProposalResolved(event) => &event.game_id,
        }
    }
}

/// Topic-based event bus
///
/// One broadcast channel per topic, created up front. Publishing is
/// best-effort: events sent while nobody is subscribed are dropped, and slow
/// subscribers observe `RecvError::Lagged` rather than blocking publishers.
#[derive(Clone)]
pub struct EventBus {
    step: broadcast::Sender<Event>,
    resolution: broadcast::Sender<Event>,
}

impl EventBus {
    /// Default capacity of each topic channel.
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            step: broadcast::channel(capacity).0,
            resolution: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Step => &self.step,
            Topic::Resolution => &self.resolution,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(%topic, "no subscribers for topic");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use polity_core::{GameState, Seed};
    use strum::IntoEnumIterator;

    fn step_event() -> Event {
        Event::StepApplied(StepEvent {
            game_id: "g".into(),
            step: 1,
            seed: Seed::new(3),
            digest: GameState::new("g").digest().unwrap(),
            effects: Vec::new(),
        })
    }

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut receivers = bus.subscribe_multiple(&Topic::iter().collect::<Vec<_>>());

        bus.publish(step_event());

        let step_rx = receivers.get_mut(&Topic::Step).unwrap();
        assert_eq!(step_rx.recv().await.unwrap(), step_event());

        let resolution_rx = receivers.get_mut(&Topic::Resolution).unwrap();
        assert!(matches!(
            resolution_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(step_event());
        assert_eq!(step_event().game_id(), "g");
    }
}
