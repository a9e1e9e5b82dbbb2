//! Player actions and the transitions they drive.
//!
//! Actions form a closed tagged union, [`PlayerAction`]. Each recognised
//! variant carries its own payload type implementing [`ActionTransition`];
//! anything else lands in [`PlayerAction::Unrecognized`], whose handling is an
//! explicit no-op rather than a fallthrough.
//!
//! # Module Structure
//!
//! - `types`: ordinals, action kinds, per-action effects
//! - `wire`: lenient `{ "type", "payload" }` JSON form
//! - `propose` / `vote`: the transitions themselves

mod propose;
mod types;
mod vote;
mod wire;

pub use propose::ProposeAction;
pub use types::{ActionEffect, ActionKind, ActionOrdinal, PayloadField, SkipReason};
pub use vote::{VoteAction, VoteReceipt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::rng::{self, StepRng};
use crate::state::{GameState, PlayerId, ProposalId, Timestamp, VoteChoice};

use wire::WireAction;

/// Defines how a concrete action variant mutates the working snapshot.
///
/// Implementations are pure: the only inputs besides the snapshot are the
/// ordinal and random stream carried in [`ActionContext`], and they never fail.
/// Malformed payloads degrade to defaults or a recorded skip.
pub trait ActionTransition {
    type Outcome;

    fn kind(&self) -> ActionKind;

    /// Applies the action to `state`, drawing from `cx` as needed.
    fn apply(&self, state: &mut GameState, cx: &mut ActionContext<'_>) -> Self::Outcome;
}

/// Per-action inputs threaded through a transition.
pub struct ActionContext<'a> {
    ordinal: ActionOrdinal,
    rng: &'a mut StepRng,
    config: &'a EngineConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(ordinal: ActionOrdinal, rng: &'a mut StepRng, config: &'a EngineConfig) -> Self {
        Self {
            ordinal,
            rng,
            config,
        }
    }

    /// 1-based position of the action within its batch.
    pub fn ordinal(&self) -> ActionOrdinal {
        self.ordinal
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    pub fn rng(&mut self) -> &mut StepRng {
        self.rng
    }

    /// Draws a synthetic timestamp for this action's ordinal.
    pub fn timestamp(&mut self) -> Timestamp {
        rng::synthetic_timestamp(self.config.base_epoch_ms, self.ordinal.get(), self.rng)
    }

    /// Draws a `"<prefix>-<base36>"` identifier.
    pub fn generate_id(&mut self, prefix: &str) -> String {
        rng::deterministic_id(prefix, self.rng)
    }
}

/// One entry of an ordered action batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireAction", into = "WireAction")]
pub enum PlayerAction {
    Propose(ProposeAction),
    Vote(VoteAction),
    /// Any `type` the engine does not handle. Applying it changes nothing but
    /// still consumes an ordinal.
    Unrecognized { kind: Option<String>, payload: Value },
}

impl PlayerAction {
    pub fn propose(
        title: impl Into<String>,
        description: impl Into<String>,
        proposer_id: impl Into<String>,
    ) -> Self {
        Self::Propose(ProposeAction::new(title, description, proposer_id))
    }

    pub fn vote(
        proposal_id: impl Into<ProposalId>,
        player_id: impl Into<PlayerId>,
        choice: impl Into<VoteChoice>,
    ) -> Self {
        Self::Vote(VoteAction::new(proposal_id, player_id, choice))
    }

    pub fn unrecognized(kind: impl Into<String>) -> Self {
        Self::Unrecognized {
            kind: Some(kind.into()),
            payload: Value::Null,
        }
    }

    /// Interprets a loosely-typed action. Never fails: values that are not
    /// objects, or lack a known `type`, become [`PlayerAction::Unrecognized`].
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(object) => Self::from(WireAction::from_object(object)),
            _ => Self::Unrecognized {
                kind: None,
                payload: Value::Null,
            },
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Propose(action) => action.kind(),
            Self::Vote(action) => action.kind(),
            Self::Unrecognized { .. } => ActionKind::Unrecognized,
        }
    }

    /// The `type` string as it appears on the wire.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Propose(_) => Some(ActionKind::Propose.as_ref()),
            Self::Vote(_) => Some(ActionKind::Vote.as_ref()),
            Self::Unrecognized { kind, .. } => kind.as_deref(),
        }
    }
}

impl From<ProposeAction> for PlayerAction {
    fn from(action: ProposeAction) -> Self {
        Self::Propose(action)
    }
}

impl From<VoteAction> for PlayerAction {
    fn from(action: VoteAction) -> Self {
        Self::Vote(action)
    }
}
