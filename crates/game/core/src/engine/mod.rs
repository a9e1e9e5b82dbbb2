//! Step engine: `(snapshot, actions, seed) -> next snapshot`.
//!
//! [`GameEngine::advance`] is the only way a snapshot moves forward. It never
//! mutates its input. A step runs in three phases:
//!
//! 1. capture the ids of proposals present at entry and clone the snapshot
//! 2. apply each action in batch order, threading its ordinal explicitly
//! 3. resolve the proposals that were already open at entry
//!
//! and finally stamps `updatedAt` according to [`UpdatedAtPolicy`].

mod resolution;
mod transition;

pub use resolution::{Resolution, Tally, resolve_pre_existing, tally_votes};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::action::{ActionContext, ActionEffect, ActionOrdinal, PlayerAction};
use crate::config::{EngineConfig, UpdatedAtPolicy};
use crate::error::EngineError;
use crate::rng::{self, Seed, StepRng};
use crate::state::{GameState, ProposalId, Timestamp};

/// Complete outcome of one step.
///
/// Carries the next snapshot together with what each action did and which
/// proposals were finalised.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub state: GameState,
    /// One entry per input action, in batch order.
    pub effects: Vec<ActionEffect>,
    pub resolutions: Vec<Resolution>,
    pub seed: Seed,
}

impl StepOutcome {
    /// Ids of proposals opened during this step.
    pub fn created_proposals(&self) -> impl Iterator<Item = &ProposalId> {
        self.effects.iter().filter_map(|effect| match effect {
            ActionEffect::ProposalCreated { proposal_id, .. } => Some(proposal_id),
            _ => None,
        })
    }

    pub fn votes_recorded(&self) -> usize {
        self.effects
            .iter()
            .filter(|effect| matches!(effect, ActionEffect::VoteRecorded { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.effects.iter().filter(|effect| effect.is_skipped()).count()
    }
}

/// Deterministic reducer over [`GameState`].
///
/// Holds only configuration; every call to [`advance`](Self::advance) is
/// independent, so one engine can serve any number of games concurrently.
#[derive(Clone, Debug, Default)]
pub struct GameEngine {
    config: EngineConfig,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies `actions` in order to a copy of `state` and resolves the
    /// proposals that were open before the step began.
    ///
    /// Proposals created by this batch stay in `voting` until the next step.
    pub fn advance(&self, state: &GameState, actions: &[PlayerAction], seed: Seed) -> StepOutcome {
        let pre_existing = state.proposal_ids();
        let mut working = state.clone();
        let mut rng = StepRng::new(seed);

        let mut effects = Vec::with_capacity(actions.len());
        let mut ordinal = ActionOrdinal::FIRST;
        for action in actions {
            let mut cx = ActionContext::new(ordinal, &mut rng, &self.config);
            effects.push(transition::apply_action(action, &mut working, &mut cx));
            ordinal = ordinal.next();
        }

        let resolutions = resolve_pre_existing(&mut working, &pre_existing);

        let updated_at = match self.config.updated_at {
            UpdatedAtPolicy::WallClock => Timestamp::now(),
            UpdatedAtPolicy::SeedDerived => {
                rng::synthetic_timestamp(self.config.base_epoch_ms, ordinal.get(), &mut rng)
            }
        };
        working.updated_at = Some(updated_at);

        debug!(
            target: "polity::engine",
            game_id = %working.id,
            seed = %seed,
            actions = actions.len(),
            draws = rng.draws(),
            resolved = resolutions.len(),
            "step applied"
        );

        StepOutcome {
            state: working,
            effects,
            resolutions,
            seed,
        }
    }

    /// Loosely-typed entry point for callers holding raw JSON.
    ///
    /// A missing or `null` action list is an empty batch; a missing or
    /// non-numeric seed coerces to the default. Fails only when `state` cannot
    /// be read as a [`GameState`] or `actions` is present but not an array.
    pub fn advance_json(
        &self,
        state: &Value,
        actions: Option<&Value>,
        seed: Option<&Value>,
    ) -> Result<Value, EngineError> {
        let typed = GameState::deserialize(state).map_err(EngineError::InvalidState)?;
        let actions = decode_actions(actions)?;

        let outcome = self.advance(&typed, &actions, Seed::from_json(seed));
        serde_json::to_value(&outcome.state).map_err(EngineError::Encode)
    }
}

/// Advances `state` with the default configuration and returns the next snapshot.
pub fn advance_game_state(state: &GameState, actions: &[PlayerAction], seed: Seed) -> GameState {
    GameEngine::default().advance(state, actions, seed).state
}

/// Reads a loosely-typed action list.
///
/// `None` and `null` are an empty batch. Entries are decoded leniently with
/// [`PlayerAction::from_value`]; only a non-array list is an error.
pub fn decode_actions(actions: Option<&Value>) -> Result<Vec<PlayerAction>, EngineError> {
    match actions {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(PlayerAction::from_value).collect()),
        Some(other) => Err(EngineError::InvalidActions {
            found: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, SkipReason};
    use crate::state::{Player, ProposalStatus};
    use serde_json::json;

    fn seeded_engine() -> GameEngine {
        GameEngine::new(EngineConfig::default().with_updated_at(UpdatedAtPolicy::SeedDerived))
    }

    fn two_player_game() -> GameState {
        GameState::new("game-1").with_players([Player::new("p1", "Alice"), Player::new("p2", "Bob")])
    }

    #[test]
    fn unknown_action_consumes_an_ordinal() {
        let engine = seeded_engine();
        let actions = [
            PlayerAction::unrecognized("filibuster"),
            PlayerAction::propose("Tax cut", "", "p1"),
        ];

        let outcome = engine.advance(&two_player_game(), &actions, Seed::new(42));

        assert_eq!(outcome.effects.len(), 2);
        assert_eq!(
            outcome.effects[0],
            ActionEffect::Skipped {
                ordinal: ActionOrdinal::FIRST,
                kind: ActionKind::Unrecognized,
                reason: SkipReason::UnrecognizedType,
            }
        );
        let proposal = &outcome.state.proposals[0];
        assert_eq!(proposal.id.as_str(), Some("proposal-9xvqmf"));
        assert_eq!(proposal.created_at.to_string(), "1970-01-01T00:00:02.448Z");
    }

    #[test]
    fn seed_derived_updated_at_is_reproducible() {
        let engine = seeded_engine();
        let actions = [PlayerAction::propose("Tax cut", "", "p1")];

        let a = engine.advance(&two_player_game(), &actions, Seed::new(42));
        let b = engine.advance(&two_player_game(), &actions, Seed::new(42));

        assert_eq!(a.state, b.state);
        let updated = a.state.updated_at.as_ref().unwrap().as_millis();
        assert!((2_000..3_000).contains(&updated));
    }

    #[test]
    fn wall_clock_updated_at_is_recent() {
        let engine = GameEngine::default();
        let before = Timestamp::now().as_millis();
        let outcome = engine.advance(&two_player_game(), &[], Seed::DEFAULT);
        let updated = outcome.state.updated_at.as_ref().unwrap().as_millis();
        assert!(updated >= before);
    }

    #[test]
    fn outcome_summarises_effects() {
        let engine = seeded_engine();
        let mut state = two_player_game();
        state = engine
            .advance(&state, &[PlayerAction::propose("Parks", "", "p2")], Seed::new(7))
            .state;
        let id = state.proposals[0].id.clone();

        let outcome = engine.advance(
            &state,
            &[
                PlayerAction::vote(id.clone(), "p1", "for"),
                PlayerAction::Vote(Default::default()),
                PlayerAction::propose("Roads", "", "p1"),
            ],
            Seed::new(7),
        );

        assert_eq!(outcome.votes_recorded(), 1);
        assert_eq!(outcome.skipped(), 1);
        assert_eq!(outcome.created_proposals().count(), 1);
        assert_eq!(outcome.resolutions.len(), 1);
        assert_eq!(outcome.resolutions[0].status, ProposalStatus::Enacted);
    }

    #[test]
    fn json_entry_point_coerces_loose_input() {
        let engine = seeded_engine();
        let state = json!({ "id": "game-1", "players": [] });
        let actions = json!([
            null,
            { "type": "propose", "payload": { "title": "Tax cut", "proposerId": "p1" } }
        ]);

        let next = engine
            .advance_json(&state, Some(&actions), Some(&json!("42")))
            .unwrap();

        assert_eq!(next["proposals"][0]["id"], json!("proposal-9xvqmf"));
        assert_eq!(next["proposals"][0]["createdAt"], json!("1970-01-01T00:00:02.448Z"));
        assert_eq!(next["votes"], json!([]));
    }

    #[test]
    fn json_entry_point_rejects_unrepresentable_state() {
        let engine = GameEngine::default();

        let err = engine
            .advance_json(&json!({ "players": "nobody" }), None, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        assert_eq!(err.error_code(), "invalid_state");

        let err = engine
            .advance_json(&json!({ "id": "g" }), Some(&json!({ "type": "vote" })), None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidActions { found: "object" }));
    }
}
