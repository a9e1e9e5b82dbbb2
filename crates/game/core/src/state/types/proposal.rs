use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::present;
use super::{PlayerId, ProposalId, Timestamp};

/// Lifecycle of a proposal. `Voting` transitions exactly once, to one of the
/// two terminal states.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProposalStatus {
    #[default]
    Voting,
    Enacted,
    Rejected,
}

impl ProposalStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Enacted | Self::Rejected)
    }
}

/// A motion put to the vote. `title` and `description` hold whatever the
/// proposer sent, so they are kept as raw JSON values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    pub proposer_id: PlayerId,
    pub created_at: Timestamp,
    pub status: ProposalStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proposal {
    pub fn is_open(&self) -> bool {
        self.status == ProposalStatus::Voting
    }

    /// The title text, when it is a string.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_and_non_string_fields_round_trip() {
        let raw = json!({
            "id": "proposal-1",
            "title": 42,
            "proposerId": "p1",
            "createdAt": "2024-01-01T00:00:00Z",
            "status": "voting",
            "tags": ["x"]
        });

        let proposal: Proposal = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(proposal.extra.get("tags"), Some(&json!(["x"])));
        assert_eq!(proposal.description, None);
        assert_eq!(serde_json::to_value(&proposal).unwrap(), raw);
    }

    #[test]
    fn explicit_null_description_is_kept() {
        let raw = json!({
            "id": "proposal-1",
            "description": null,
            "proposerId": "p1",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "status": "enacted"
        });

        let proposal: Proposal = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(proposal.description, Some(Value::Null));
        assert_eq!(serde_json::to_value(&proposal).unwrap(), raw);
    }
}
