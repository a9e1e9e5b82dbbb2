//! Cloneable façade for issuing commands to one game's worker.
//!
//! [`GameHandle`] hides channel plumbing and offers async helpers for
//! advancing the game or streaming events from specific topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use polity_core::{ActionEffect, GameState, PlayerAction, Resolution, Seed, StateDigest};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::repository::StoredGame;
use crate::workers::Command;

/// Summary of one committed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub game_id: String,
    pub step: u64,
    pub seed: Seed,
    pub digest: StateDigest,
    pub effects: Vec<ActionEffect>,
    pub resolutions: Vec<Resolution>,
    /// Snapshot after the step.
    pub state: GameState,
    /// Committed steps whose audit records the audit log has not accepted
    /// yet. They are retried, in order, before the next step's record.
    pub audit_backlog: usize,
}

/// Client-facing handle to a single game
#[derive(Clone)]
pub struct GameHandle {
    game_id: Arc<str>,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl GameHandle {
    pub(crate) fn new(game_id: &str, command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            game_id: Arc::from(game_id),
            command_tx,
            event_bus,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Apply `actions` as the game's next step.
    ///
    /// Steps for one game are applied strictly in the order their commands
    /// reach the worker. The seed is derived from the game id and step counter.
    pub async fn advance(&self, actions: Vec<PlayerAction>) -> Result<StepReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Advance {
                actions,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Current snapshot together with its step counter and digest.
    pub async fn snapshot(&self) -> Result<StoredGame> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Current game state (read-only copy).
    pub async fn state(&self) -> Result<GameState> {
        Ok(self.snapshot().await?.state)
    }

    /// Subscribe to events from a specific topic.
    ///
    /// The bus is shared by every game in the runtime; filter on
    /// [`Event::game_id`] to follow a single game.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub(crate) async fn shutdown(&self) {
        // A closed channel means the worker already stopped.
        let _ = self.command_tx.send(Command::Shutdown).await;
    }
}
