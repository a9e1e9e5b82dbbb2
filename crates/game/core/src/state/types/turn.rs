use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Turn bookkeeping carried in the snapshot. Managed by the caller; the engine
/// copies it through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_number: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TurnInfo {
    pub fn new(turn_number: u64, phase: impl Into<String>) -> Self {
        Self {
            turn_number: Some(Number::from(turn_number)),
            phase: Some(phase.into()),
            extra: Map::new(),
        }
    }
}

/// Macro-economic indicators. Opaque to the step engine.
///
/// Numbers are held as [`Number`] so `100` and `100.0` each survive a step in
/// the form the caller wrote them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Economy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasury: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unemployment_rate: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
