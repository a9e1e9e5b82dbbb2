//! Lenient JSON form of an action: `{ "type": <string>, "payload": { ... } }`.
//!
//! Decoding never rejects a payload. A field is present when its value is
//! truthy in the JavaScript sense and is then kept exactly as sent; `null`,
//! `false`, `0`, `""` and absent keys all read as missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{PlayerAction, ProposeAction, VoteAction};
use crate::state::{PlayerId, ProposalId, VoteChoice, is_truthy};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(super) struct WireAction {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

impl WireAction {
    pub(super) fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            kind: object.get("type").cloned(),
            payload: object.get("payload").cloned().unwrap_or(Value::Null),
        }
    }
}

impl From<WireAction> for PlayerAction {
    fn from(wire: WireAction) -> Self {
        let kind = match wire.kind {
            Some(Value::String(kind)) => Some(kind),
            _ => None,
        };

        match kind.as_deref() {
            Some("propose") => Self::Propose(ProposeAction {
                title: truthy_field(&wire.payload, "title"),
                description: truthy_field(&wire.payload, "description"),
                proposer_id: truthy_field(&wire.payload, "proposerId").map(PlayerId),
            }),
            Some("vote") => Self::Vote(VoteAction {
                proposal_id: truthy_field(&wire.payload, "proposalId").map(ProposalId),
                player_id: truthy_field(&wire.payload, "playerId").map(PlayerId),
                choice: truthy_field(&wire.payload, "choice").map(VoteChoice::from),
            }),
            _ => Self::Unrecognized {
                kind,
                payload: wire.payload,
            },
        }
    }
}

impl From<PlayerAction> for WireAction {
    fn from(action: PlayerAction) -> Self {
        match action {
            PlayerAction::Propose(propose) => {
                let mut payload = Map::new();
                insert_field(&mut payload, "title", propose.title);
                insert_field(&mut payload, "description", propose.description);
                insert_field(&mut payload, "proposerId", propose.proposer_id.map(|id| id.0));
                Self::tagged("propose", payload)
            }
            PlayerAction::Vote(vote) => {
                let mut payload = Map::new();
                insert_field(&mut payload, "proposalId", vote.proposal_id.map(|id| id.0));
                insert_field(&mut payload, "playerId", vote.player_id.map(|id| id.0));
                insert_field(&mut payload, "choice", vote.choice.map(Value::from));
                Self::tagged("vote", payload)
            }
            PlayerAction::Unrecognized { kind, payload } => Self {
                kind: kind.map(Value::String),
                payload,
            },
        }
    }
}

impl WireAction {
    fn tagged(kind: &str, payload: Map<String, Value>) -> Self {
        Self {
            kind: Some(Value::String(kind.to_string())),
            payload: Value::Object(payload),
        }
    }
}

/// Reads `payload[key]` when it is truthy, verbatim.
fn truthy_field(payload: &Value, key: &str) -> Option<Value> {
    payload.get(key).filter(|value| is_truthy(value)).cloned()
}

fn insert_field(payload: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        payload.insert(key.to_string(), value);
    }
}
