//! Event payloads for each topic.

use serde::{Deserialize, Serialize};

use polity_core::{ActionEffect, Resolution, Seed, StateDigest};

/// A step was applied and committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub game_id: String,
    pub step: u64,
    pub seed: Seed,
    pub digest: StateDigest,
    /// What each action in the batch did, in batch order.
    pub effects: Vec<ActionEffect>,
}

/// A proposal left `voting` during a committed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEvent {
    pub game_id: String,
    pub step: u64,
    pub resolution: Resolution,
}
