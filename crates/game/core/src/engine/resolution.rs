//! Resolution pass: finalises proposals that were open when the step began.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::state::{GameState, ProposalId, ProposalStatus, Vote, VoteChoice};

/// Vote counts for one proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub votes_for: u32,
    pub votes_against: u32,
    /// Abstentions and unrecognised choices. Never affects the outcome.
    pub excluded: u32,
}

impl Tally {
    pub fn record(&mut self, choice: &VoteChoice) {
        match choice {
            VoteChoice::For => self.votes_for += 1,
            VoteChoice::Against => self.votes_against += 1,
            VoteChoice::Abstain | VoteChoice::Other(_) => self.excluded += 1,
        }
    }

    /// Strict majority enacts; a tie or an against-majority rejects.
    pub fn outcome(&self) -> ProposalStatus {
        if self.votes_for > self.votes_against {
            ProposalStatus::Enacted
        } else {
            ProposalStatus::Rejected
        }
    }
}

/// A proposal moved out of `voting` by the resolution pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub proposal_id: ProposalId,
    pub tally: Tally,
    pub status: ProposalStatus,
}

/// Counts every recorded vote per proposal id. Duplicate votes all count.
pub fn tally_votes(votes: &[Vote]) -> HashMap<&ProposalId, Tally> {
    let mut tallies: HashMap<&ProposalId, Tally> = HashMap::new();
    for vote in votes {
        tallies.entry(&vote.proposal_id).or_default().record(&vote.choice);
    }
    tallies
}

/// Resolves every `voting` proposal whose id is in `pre_existing`.
///
/// Proposals created during the current step are skipped, as are proposals
/// already in a terminal state. Returns the resolutions in proposal order.
pub fn resolve_pre_existing(
    state: &mut GameState,
    pre_existing: &HashSet<ProposalId>,
) -> Vec<Resolution> {
    let GameState {
        proposals, votes, ..
    } = state;
    let tallies = tally_votes(votes);

    let mut resolutions = Vec::new();
    for proposal in proposals.iter_mut() {
        if !proposal.is_open() || !pre_existing.contains(&proposal.id) {
            continue;
        }

        let tally = tallies.get(&proposal.id).copied().unwrap_or_default();
        proposal.status = tally.outcome();
        resolutions.push(Resolution {
            proposal_id: proposal.id.clone(),
            tally,
            status: proposal.status,
        });
    }

    resolutions
}
