//! Deterministic replay of an audit log.
//!
//! Re-running every recorded step from the initial snapshot must reproduce the
//! recorded digests exactly. Any divergence means the log, the initial
//! snapshot, or the engine configuration does not match what produced it.

use thiserror::Error;

use polity_core::{GameEngine, GameState, StateDigest};

use crate::repository::StepRecord;

/// Which side of a step a digest was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DigestPosition {
    Before,
    After,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("record for step {step} belongs to game {found}, expected {expected}")]
    ForeignRecord {
        step: u64,
        expected: String,
        found: String,
    },

    #[error("step {found} is out of sequence, expected step {expected}")]
    OutOfSequence { expected: u64, found: u64 },

    #[error("digest mismatch {position} step {step}: recorded {recorded}, replayed {replayed}")]
    DigestMismatch {
        step: u64,
        position: DigestPosition,
        recorded: StateDigest,
        replayed: StateDigest,
    },

    #[error("failed to digest game state")]
    Digest(#[source] serde_json::Error),
}

/// Final state of a successful replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub steps: u64,
    pub digest: StateDigest,
    pub state: GameState,
}

/// Re-applies `records` to `initial` in order, checking every recorded digest.
///
/// `initial` is the snapshot the game was created with (step `0`), and
/// `records` must be consecutive starting at step `1`. The engine must be
/// configured like the one that wrote the log; `updatedAt` is excluded from
/// digests, so the wall-clock policy replays cleanly.
pub fn replay(
    engine: &GameEngine,
    initial: &GameState,
    records: &[StepRecord],
) -> Result<ReplaySummary, ReplayError> {
    let mut state = initial.clone();
    let mut digest = state.digest().map_err(ReplayError::Digest)?;
    let mut steps = 0;

    for record in records {
        if record.game_id != initial.id {
            return Err(ReplayError::ForeignRecord {
                step: record.step,
                expected: initial.id.clone(),
                found: record.game_id.clone(),
            });
        }
        if record.step != steps + 1 {
            return Err(ReplayError::OutOfSequence {
                expected: steps + 1,
                found: record.step,
            });
        }
        check(record.step, DigestPosition::Before, record.digest_before, digest)?;

        state = engine.advance(&state, &record.actions, record.seed).state;
        digest = state.digest().map_err(ReplayError::Digest)?;
        check(record.step, DigestPosition::After, record.digest_after, digest)?;

        steps = record.step;
        tracing::trace!(step = steps, %digest, "replayed step");
    }

    Ok(ReplaySummary {
        steps,
        digest,
        state,
    })
}

fn check(
    step: u64,
    position: DigestPosition,
    recorded: StateDigest,
    replayed: StateDigest,
) -> Result<(), ReplayError> {
    if recorded == replayed {
        Ok(())
    } else {
        Err(ReplayError::DigestMismatch {
            step,
            position,
            recorded,
            replayed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polity_core::{Player, PlayerAction, Seed, compute_seed};

    fn initial() -> GameState {
        GameState::new("game-1").with_players([Player::new("p1", "Alice"), Player::new("p2", "Bob")])
    }

    /// Runs `batches` through the engine and records them the way a worker would.
    fn record_steps(engine: &GameEngine, batches: Vec<Vec<PlayerAction>>) -> Vec<StepRecord> {
        let mut state = initial();
        let mut records = Vec::new();
        for (index, actions) in batches.into_iter().enumerate() {
            let step = index as u64 + 1;
            let seed = compute_seed(&state.id, step);
            let before = state.digest().unwrap();
            state = engine.advance(&state, &actions, seed).state;
            records.push(StepRecord {
                game_id: state.id.clone(),
                step,
                seed,
                actions,
                digest_before: before,
                digest_after: state.digest().unwrap(),
            });
        }
        records
    }

    fn two_step_log(engine: &GameEngine) -> Vec<StepRecord> {
        let propose = vec![PlayerAction::propose("Parks", "", "p1")];
        let opened = engine.advance(&initial(), &propose, compute_seed("game-1", 1));
        let id = opened.state.proposals[0].id.clone();

        record_steps(
            engine,
            vec![
                propose,
                vec![
                    PlayerAction::vote(id.clone(), "p1", "for"),
                    PlayerAction::vote(id.clone(), "p2", "for"),
                ],
            ],
        )
    }

    #[test]
    fn faithful_log_replays_to_the_same_digest() {
        let engine = GameEngine::default();
        let records = two_step_log(&engine);

        let summary = replay(&engine, &initial(), &records).unwrap();

        assert_eq!(summary.steps, 2);
        assert_eq!(summary.digest, records[1].digest_after);
        assert!(summary.state.proposals[0].status.is_terminal());
    }

    #[test]
    fn tampered_seed_is_detected() {
        let engine = GameEngine::default();
        let mut records = two_step_log(&engine);
        records[0].seed = Seed::new(999);

        let err = replay(&engine, &initial(), &records).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::DigestMismatch { step: 1, position: DigestPosition::After, .. }
        ));
    }

    #[test]
    fn wrong_initial_state_is_detected_before_the_first_step() {
        let engine = GameEngine::default();
        let records = two_step_log(&engine);
        let mut other = initial();
        other.name = Some("Renamed".into());

        let err = replay(&engine, &other, &records).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::DigestMismatch { step: 1, position: DigestPosition::Before, .. }
        ));
    }

    #[test]
    fn gaps_in_the_log_are_rejected() {
        let engine = GameEngine::default();
        let records = two_step_log(&engine);

        let err = replay(&engine, &initial(), &records[1..]).unwrap_err();
        assert!(matches!(err, ReplayError::OutOfSequence { expected: 1, found: 2 }));
    }
}
