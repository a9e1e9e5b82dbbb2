//! Dispatch of a single action to its transition.

use tracing::trace;

use crate::action::{
    ActionContext, ActionEffect, ActionKind, ActionTransition, PlayerAction, SkipReason,
};
use crate::state::GameState;

/// Applies one action to the working snapshot and reports its effect.
///
/// Every variant is handled explicitly; unrecognised types are a deliberate
/// no-op that still consumes the ordinal held in `cx`.
pub(super) fn apply_action(
    action: &PlayerAction,
    state: &mut GameState,
    cx: &mut ActionContext<'_>,
) -> ActionEffect {
    let ordinal = cx.ordinal();

    match action {
        PlayerAction::Propose(propose) => {
            let proposal_id = propose.apply(state, cx);
            ActionEffect::ProposalCreated {
                ordinal,
                proposal_id,
            }
        }
        PlayerAction::Vote(vote) => match vote.apply(state, cx) {
            Ok(receipt) => ActionEffect::VoteRecorded {
                ordinal,
                proposal_id: receipt.proposal_id,
                player_id: receipt.player_id,
            },
            Err(reason) => {
                trace!(target: "polity::engine", %ordinal, %reason, "vote skipped");
                ActionEffect::Skipped {
                    ordinal,
                    kind: ActionKind::Vote,
                    reason,
                }
            }
        },
        PlayerAction::Unrecognized { kind, .. } => {
            trace!(
                target: "polity::engine",
                %ordinal,
                kind = kind.as_deref().unwrap_or("<none>"),
                "unrecognized action ignored"
            );
            ActionEffect::Skipped {
                ordinal,
                kind: ActionKind::Unrecognized,
                reason: SkipReason::UnrecognizedType,
            }
        }
    }
}
