use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PlayerId, ProposalId, Timestamp};

/// Ballot value as submitted.
///
/// Only `For` and `Against` count toward resolution. Anything else, string or
/// not, is kept verbatim in `Other` so the recorded history matches what was
/// cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
    Other(Value),
}

impl VoteChoice {
    /// The ballot text, when the choice is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::For => Some("for"),
            Self::Against => Some("against"),
            Self::Abstain => Some("abstain"),
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Whether this choice is one of the three recognised ballot values.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<Value> for VoteChoice {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("for") => Self::For,
            Some("against") => Self::Against,
            Some("abstain") => Self::Abstain,
            _ => Self::Other(raw),
        }
    }
}

impl From<String> for VoteChoice {
    fn from(raw: String) -> Self {
        Self::from(Value::String(raw))
    }
}

impl From<&str> for VoteChoice {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<VoteChoice> for Value {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Other(raw) => raw,
            VoteChoice::For => Value::from("for"),
            VoteChoice::Against => Value::from("against"),
            VoteChoice::Abstain => Value::from("abstain"),
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(Value::String(text)) => f.write_str(text),
            Self::Other(raw) => write!(f, "{raw}"),
            known => f.write_str(known.as_str().unwrap_or_default()),
        }
    }
}

/// Append-only ballot record. Repeated votes by the same player all count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub player_id: PlayerId,
    pub proposal_id: ProposalId,
    pub choice: VoteChoice,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrecognised_choices_round_trip_verbatim() {
        let choice: VoteChoice = serde_json::from_str("\"maybe\"").unwrap();
        assert_eq!(choice, VoteChoice::Other(json!("maybe")));
        assert!(!choice.is_recognized());
        assert_eq!(serde_json::to_string(&choice).unwrap(), "\"maybe\"");

        let choice: VoteChoice = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(choice, VoteChoice::Other(json!(true)));
        assert_eq!(serde_json::to_value(&choice).unwrap(), json!(true));
    }

    #[test]
    fn choices_are_case_sensitive() {
        assert_eq!(VoteChoice::from("FOR"), VoteChoice::Other(json!("FOR")));
        assert_eq!(VoteChoice::from("for"), VoteChoice::For);
    }

    #[test]
    fn vote_keeps_unknown_fields() {
        let raw = json!({
            "playerId": "p1",
            "proposalId": 7,
            "choice": "for",
            "timestamp": "2024-01-01T00:00:00Z",
            "weight": 2
        });

        let vote: Vote = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(vote.proposal_id, ProposalId::from(json!(7)));
        assert_eq!(vote.extra.get("weight"), Some(&json!(2)));
        assert_eq!(serde_json::to_value(&vote).unwrap(), raw);
    }
}
