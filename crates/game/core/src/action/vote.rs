use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{ActionContext, ActionKind, ActionTransition, PayloadField, SkipReason};
use crate::state::{GameState, PlayerId, ProposalId, Vote, VoteChoice};

/// Records a ballot against a proposal.
///
/// All three fields are required; if any is missing (falsy) the action is
/// skipped and draws nothing from the random stream. Referential checks (that
/// the proposal or player exists) and choice validation are left to the
/// request boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteAction {
    pub proposal_id: Option<ProposalId>,
    pub player_id: Option<PlayerId>,
    pub choice: Option<VoteChoice>,
}

impl VoteAction {
    pub fn new(
        proposal_id: impl Into<ProposalId>,
        player_id: impl Into<PlayerId>,
        choice: impl Into<VoteChoice>,
    ) -> Self {
        Self {
            proposal_id: Some(proposal_id.into()),
            player_id: Some(player_id.into()),
            choice: Some(choice.into()),
        }
    }
}

/// Identifies a vote that was appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteReceipt {
    pub proposal_id: ProposalId,
    pub player_id: PlayerId,
}

impl ActionTransition for VoteAction {
    type Outcome = Result<VoteReceipt, SkipReason>;

    fn kind(&self) -> ActionKind {
        ActionKind::Vote
    }

    fn apply(&self, state: &mut GameState, cx: &mut ActionContext<'_>) -> Self::Outcome {
        let proposal_id = self
            .proposal_id
            .clone()
            .ok_or(SkipReason::MissingField(PayloadField::ProposalId))?;
        let player_id = self
            .player_id
            .clone()
            .ok_or(SkipReason::MissingField(PayloadField::PlayerId))?;
        let choice = self
            .choice
            .clone()
            .ok_or(SkipReason::MissingField(PayloadField::Choice))?;

        state.votes.push(Vote {
            player_id: player_id.clone(),
            proposal_id: proposal_id.clone(),
            choice,
            timestamp: cx.timestamp(),
            extra: Map::new(),
        });

        Ok(VoteReceipt {
            proposal_id,
            player_id,
        })
    }
}
