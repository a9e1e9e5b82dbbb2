use serde::{Deserialize, Serialize};

/// How the engine stamps `updatedAt` on the snapshot it returns.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UpdatedAtPolicy {
    /// Real wall-clock time at the end of the step. Consumers that use
    /// `updatedAt` for cache invalidation rely on this.
    #[default]
    WallClock,
    /// Drawn from the step's random stream after the resolution pass, making
    /// the whole snapshot reproducible from `(state, actions, seed)`.
    SeedDerived,
}

/// Engine configuration and tunable constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Epoch (in Unix milliseconds) that synthetic timestamps are offset from.
    pub base_epoch_ms: i64,
    /// Prefix of generated proposal ids (`"<prefix>-<base36>"`).
    pub proposal_id_prefix: String,
    pub updated_at: UpdatedAtPolicy,
}

impl EngineConfig {
    pub const DEFAULT_BASE_EPOCH_MS: i64 = 0;
    pub const DEFAULT_PROPOSAL_ID_PREFIX: &'static str = "proposal";

    // ===== proposal defaults for malformed payloads =====
    pub const DEFAULT_PROPOSAL_TITLE: &'static str = "Untitled";
    pub const DEFAULT_PROPOSER_ID: &'static str = "unknown";

    pub fn new() -> Self {
        Self {
            base_epoch_ms: Self::DEFAULT_BASE_EPOCH_MS,
            proposal_id_prefix: Self::DEFAULT_PROPOSAL_ID_PREFIX.to_string(),
            updated_at: UpdatedAtPolicy::default(),
        }
    }

    pub fn with_updated_at(mut self, policy: UpdatedAtPolicy) -> Self {
        self.updated_at = policy;
        self
    }

    pub fn with_base_epoch_ms(mut self, base_epoch_ms: i64) -> Self {
        self.base_epoch_ms = base_epoch_ms;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
