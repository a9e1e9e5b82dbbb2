use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ActionContext, ActionKind, ActionTransition};
use crate::config::EngineConfig;
use crate::state::{GameState, PlayerId, Proposal, ProposalId, ProposalStatus};

/// Opens a new proposal in `voting`.
///
/// Missing fields are filled with defaults rather than rejected, so a
/// `propose` action always produces a proposal. Present fields are stored as
/// sent, whatever their JSON type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeAction {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub proposer_id: Option<PlayerId>,
}

impl ProposeAction {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        proposer_id: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(Value::String(title.into())),
            description: Some(Value::String(description.into())),
            proposer_id: Some(PlayerId::new(proposer_id)),
        }
    }
}

impl ActionTransition for ProposeAction {
    type Outcome = ProposalId;

    fn kind(&self) -> ActionKind {
        ActionKind::Propose
    }

    fn apply(&self, state: &mut GameState, cx: &mut ActionContext<'_>) -> ProposalId {
        // Draw order is id first, then timestamp.
        let prefix = &cx.config().proposal_id_prefix;
        let id = ProposalId::new(cx.generate_id(prefix));
        let created_at = cx.timestamp();

        let proposal = Proposal {
            id: id.clone(),
            title: Some(
                self.title
                    .clone()
                    .unwrap_or_else(|| Value::from(EngineConfig::DEFAULT_PROPOSAL_TITLE)),
            ),
            description: Some(self.description.clone().unwrap_or_else(|| Value::from(""))),
            proposer_id: self
                .proposer_id
                .clone()
                .unwrap_or_else(|| PlayerId::from(EngineConfig::DEFAULT_PROPOSER_ID)),
            created_at,
            status: ProposalStatus::Voting,
            extra: Map::new(),
        };
        state.proposals.push(proposal);

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionOrdinal;
    use crate::rng::{Seed, StepRng};
    use serde_json::json;

    #[test]
    fn creates_voting_proposal_from_stream() {
        let config = EngineConfig::default();
        let mut rng = StepRng::new(Seed::new(42));
        let mut state = GameState::new("game-1");

        let action = ProposeAction::new("Tax cut", "Cut taxes", "p1");
        let mut cx = ActionContext::new(ActionOrdinal::FIRST, &mut rng, &config);
        let id = action.apply(&mut state, &mut cx);

        assert_eq!(id.as_str(), Some("proposal-9xvqmf"));
        let proposal = &state.proposals[0];
        assert_eq!(proposal.status, ProposalStatus::Voting);
        assert_eq!(proposal.title_text(), Some("Tax cut"));
        assert_eq!(proposal.description, Some(json!("Cut taxes")));
        assert_eq!(proposal.proposer_id.as_str(), Some("p1"));
        assert_eq!(proposal.created_at.to_string(), "1970-01-01T00:00:01.448Z");
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn empty_payload_gets_defaults() {
        let config = EngineConfig::default();
        let mut rng = StepRng::new(Seed::DEFAULT);
        let mut state = GameState::new("game-1");

        let mut cx = ActionContext::new(ActionOrdinal::FIRST, &mut rng, &config);
        ProposeAction::default().apply(&mut state, &mut cx);

        let proposal = &state.proposals[0];
        assert_eq!(proposal.title_text(), Some("Untitled"));
        assert_eq!(proposal.description, Some(json!("")));
        assert_eq!(proposal.proposer_id.as_str(), Some("unknown"));
        assert_eq!(proposal.id.as_str(), Some("proposal-adcdck"));
        assert_eq!(proposal.created_at.to_string(), "1970-01-01T00:00:01.002Z");
    }

    #[test]
    fn custom_prefix_and_epoch_apply() {
        let mut config = EngineConfig::default().with_base_epoch_ms(1_700_000_000_000);
        config.proposal_id_prefix = "bill".to_string();
        let mut rng = StepRng::new(Seed::new(42));
        let mut state = GameState::new("game-1");

        let mut cx = ActionContext::new(ActionOrdinal::new(3), &mut rng, &config);
        let id = ProposeAction::default().apply(&mut state, &mut cx);

        assert_eq!(id.as_str(), Some("bill-9xvqmf"));
        assert_eq!(
            state.proposals[0].created_at.as_millis(),
            1_700_000_000_000 + 3_000 + 448
        );
    }

    #[test]
    fn non_string_fields_are_stored_as_sent() {
        let config = EngineConfig::default();
        let mut rng = StepRng::new(Seed::new(42));
        let mut state = GameState::new("game-1");

        let action = ProposeAction {
            title: Some(json!(2024)),
            description: Some(json!({ "lang": "en" })),
            proposer_id: Some(PlayerId::from(json!(7))),
        };
        let mut cx = ActionContext::new(ActionOrdinal::FIRST, &mut rng, &config);
        action.apply(&mut state, &mut cx);

        let proposal = &state.proposals[0];
        assert_eq!(proposal.title, Some(json!(2024)));
        assert_eq!(proposal.description, Some(json!({ "lang": "en" })));
        assert_eq!(proposal.proposer_id.as_value(), &json!(7));
    }
}
