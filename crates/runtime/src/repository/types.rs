//! Records persisted by the repository layer.

use serde::{Deserialize, Serialize};

use polity_core::{GameState, PlayerAction, Seed, StateDigest};

/// A game snapshot together with its step counter and digest.
///
/// `step` counts applied steps: a freshly created game is at step `0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub step: u64,
    pub digest: StateDigest,
    pub state: GameState,
}

impl StoredGame {
    /// Wraps a newly created game at step `0`.
    pub fn initial(state: GameState) -> Result<Self, serde_json::Error> {
        Self::at_step(0, state)
    }

    pub fn at_step(step: u64, state: GameState) -> Result<Self, serde_json::Error> {
        let digest = state.digest()?;
        Ok(Self {
            step,
            digest,
            state,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.state.id
    }
}

/// One applied step as written to the audit log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub game_id: String,
    /// Step counter after this step was applied (first step is `1`).
    pub step: u64,
    pub seed: Seed,
    pub actions: Vec<PlayerAction>,
    pub digest_before: StateDigest,
    pub digest_after: StateDigest,
}
