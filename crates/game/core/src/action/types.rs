use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{PlayerId, ProposalId};

/// Action types understood by the dispatcher.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Propose,
    Vote,
    Unrecognized,
}

/// 1-based position of an action within its batch.
///
/// Every action consumes an ordinal, including ones that end up as no-ops, so
/// the synthetic timestamps of later actions depend on everything before them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionOrdinal(u64);

impl ActionOrdinal {
    pub const FIRST: Self = Self(1);

    pub const fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ActionOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload fields a vote cannot be recorded without.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PayloadField {
    ProposalId,
    PlayerId,
    Choice,
}

/// Why an action left the snapshot untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "field")]
pub enum SkipReason {
    /// A required payload field was absent or empty.
    MissingField(PayloadField),
    /// The action type is not handled by this engine.
    UnrecognizedType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing payload field `{field}`"),
            Self::UnrecognizedType => f.write_str("unrecognized action type"),
        }
    }
}

/// What a single action did to the working snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum ActionEffect {
    ProposalCreated {
        ordinal: ActionOrdinal,
        proposal_id: ProposalId,
    },
    VoteRecorded {
        ordinal: ActionOrdinal,
        proposal_id: ProposalId,
        player_id: PlayerId,
    },
    Skipped {
        ordinal: ActionOrdinal,
        kind: ActionKind,
        reason: SkipReason,
    },
}

impl ActionEffect {
    pub fn ordinal(&self) -> ActionOrdinal {
        match self {
            Self::ProposalCreated { ordinal, .. }
            | Self::VoteRecorded { ordinal, .. }
            | Self::Skipped { ordinal, .. } => *ordinal,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
