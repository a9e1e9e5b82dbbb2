//! Game worker that owns one game's authoritative [`polity_core::GameState`].
//!
//! Receives commands from [`GameHandle`](crate::api::GameHandle), advances the
//! game via [`polity_core::GameEngine`], persists the result, and publishes
//! events.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use polity_core::{GameEngine, PlayerAction, compute_seed};

use crate::api::{Result, RuntimeError, StepReport};
use crate::events::{Event, EventBus, ResolutionEvent, StepEvent};
use crate::repository::{AuditLog, GameRepository, RepositoryError, StepRecord, StoredGame};

/// Commands that can be sent to a game worker
pub enum Command {
    /// Apply one batch of actions as the next step.
    Advance {
        actions: Vec<PlayerAction>,
        reply: oneshot::Sender<Result<StepReport>>,
    },
    /// Query the current snapshot (read-only).
    Snapshot { reply: oneshot::Sender<StoredGame> },
    /// Stop processing commands.
    Shutdown,
}

/// Background task that serializes every step of one game.
///
/// Audit records of committed steps wait in `audit_backlog` until the audit
/// log accepts them, and are written strictly in step order.
pub struct GameWorker {
    game: StoredGame,
    audit_backlog: VecDeque<StepRecord>,
    engine: Arc<GameEngine>,
    repository: Arc<dyn GameRepository>,
    audit_log: Arc<dyn AuditLog>,
    event_bus: EventBus,
    command_rx: mpsc::Receiver<Command>,
}

impl GameWorker {
    pub fn new(
        game: StoredGame,
        engine: Arc<GameEngine>,
        repository: Arc<dyn GameRepository>,
        audit_log: Arc<dyn AuditLog>,
        event_bus: EventBus,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            game,
            audit_backlog: VecDeque::new(),
            engine,
            repository,
            audit_log,
            event_bus,
            command_rx,
        }
    }

    /// Main worker loop. Exits on `Shutdown` or once every handle is dropped.
    pub async fn run(mut self) {
        debug!(target: "runtime::worker", game_id = self.game.game_id(), step = self.game.step, "worker started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                Command::Advance { actions, reply } => {
                    let result = self.advance(actions);
                    let _ = reply.send(result);
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.game.clone());
                }
                Command::Shutdown => break,
            }
        }

        if let Err(error) = self.flush_audit() {
            warn!(
                target: "runtime::worker",
                game_id = self.game.game_id(),
                pending = self.audit_backlog.len(),
                %error,
                "audit records dropped at shutdown"
            );
        }

        debug!(target: "runtime::worker", game_id = self.game.game_id(), "worker stopped");
    }

    fn advance(&mut self, actions: Vec<PlayerAction>) -> Result<StepReport> {
        let game_id = self.game.game_id().to_string();
        let step = self.game.step + 1;
        let seed = compute_seed(&game_id, step);

        let outcome = self.engine.advance(&self.game.state, &actions, seed);
        let digest = outcome.state.digest().map_err(RuntimeError::Digest)?;

        let next = StoredGame {
            step,
            digest,
            state: outcome.state,
        };

        // The repository swap is the commit point. A lost race leaves the
        // audit log untouched and resynchronises the worker with storage.
        if let Err(error) = self.repository.swap(self.game.step, &next) {
            warn!(target: "runtime::worker", %game_id, step, %error, "step not committed");
            if matches!(error, RepositoryError::StaleWrite { .. }) {
                self.reload(&game_id);
            }
            return Err(error.into());
        }

        let action_count = actions.len();
        self.audit_backlog.push_back(StepRecord {
            game_id: game_id.clone(),
            step,
            seed,
            actions,
            digest_before: self.game.digest,
            digest_after: digest,
        });
        self.game = next;

        if let Err(error) = self.flush_audit() {
            warn!(
                target: "runtime::worker",
                %game_id,
                step,
                pending = self.audit_backlog.len(),
                %error,
                "audit append deferred"
            );
        }

        info!(
            target: "runtime::worker",
            %game_id,
            step,
            %seed,
            actions = action_count,
            resolved = outcome.resolutions.len(),
            "step committed"
        );

        self.event_bus.publish(Event::StepApplied(StepEvent {
            game_id: game_id.clone(),
            step,
            seed,
            digest,
            effects: outcome.effects.clone(),
        }));
        for resolution in &outcome.resolutions {
            self.event_bus.publish(Event::ProposalResolved(ResolutionEvent {
                game_id: game_id.clone(),
                step,
                resolution: resolution.clone(),
            }));
        }

        Ok(StepReport {
            game_id,
            step,
            seed,
            digest,
            effects: outcome.effects,
            resolutions: outcome.resolutions,
            state: self.game.state.clone(),
            audit_backlog: self.audit_backlog.len(),
        })
    }

    /// Appends queued audit records oldest first, stopping at the first failure.
    fn flush_audit(&mut self) -> std::result::Result<(), RepositoryError> {
        while let Some(record) = self.audit_backlog.front() {
            self.audit_log.append(record)?;
            self.audit_backlog.pop_front();
        }
        Ok(())
    }

    /// Replaces the cached snapshot with whatever storage holds now.
    fn reload(&mut self, game_id: &str) {
        match self.repository.load(game_id) {
            Ok(Some(game)) => {
                debug!(target: "runtime::worker", %game_id, step = game.step, "reloaded from repository");
                self.game = game;
            }
            Ok(None) => warn!(target: "runtime::worker", %game_id, "game vanished from repository"),
            Err(error) => warn!(target: "runtime::worker", %game_id, %error, "reload failed"),
        }
    }
}
