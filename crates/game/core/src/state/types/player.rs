use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PlayerId;

/// Participant in a game. The engine only reads `id`; every other field
/// supplied by the caller is preserved across steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("displayName".to_string(), Value::String(display_name.into()));
        Self {
            id: PlayerId::new(id),
            extra,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.extra.get("displayName").and_then(Value::as_str)
    }
}
