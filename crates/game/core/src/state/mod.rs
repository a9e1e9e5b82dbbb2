//! Authoritative game snapshot.
//!
//! A [`GameState`] is a plain value: the engine clones it, mutates the clone,
//! and hands the clone back. Unknown top-level fields are retained in
//! [`GameState::extra`] so a step never drops data it does not understand.
pub mod types;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub use types::{
    Economy, Player, PlayerId, Proposal, ProposalId, ProposalStatus, Timestamp, TurnInfo, Vote,
    VoteChoice, is_truthy,
};

/// Canonical snapshot of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub players: Vec<Player>,
    /// Append-only; never pruned by the engine.
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    /// Append-only; never pruned by the engine.
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy: Option<Economy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<TurnInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Caller-owned fields the engine does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameState {
    /// Creates an empty game at turn 1 in the `voting` phase.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            players: Vec::new(),
            proposals: Vec::new(),
            votes: Vec::new(),
            economy: None,
            turn: Some(TurnInfo::new(1, "voting")),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_players(mut self, players: impl IntoIterator<Item = Player>) -> Self {
        self.players.extend(players);
        self
    }

    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.iter().find(|proposal| &proposal.id == id)
    }

    /// Votes recorded against `id`, in recording order.
    pub fn votes_for_proposal<'a>(&'a self, id: &'a ProposalId) -> impl Iterator<Item = &'a Vote> {
        self.votes.iter().filter(move |vote| &vote.proposal_id == id)
    }

    /// Proposals still in `voting`.
    pub fn open_proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().filter(|proposal| proposal.is_open())
    }

    /// Ids of every proposal currently in the snapshot.
    pub fn proposal_ids(&self) -> HashSet<ProposalId> {
        self.proposals
            .iter()
            .map(|proposal| proposal.id.clone())
            .collect()
    }

    /// SHA-256 over the canonical JSON form of the snapshot, excluding
    /// `updatedAt`.
    ///
    /// Two snapshots produced from the same `(state, actions, seed)` always
    /// share a digest regardless of the `updatedAt` policy in effect.
    pub fn digest(&self) -> Result<StateDigest, serde_json::Error> {
        let mut canonical = self.clone();
        canonical.updated_at = None;

        let bytes = serde_json::to_vec(&canonical)?;
        Ok(StateDigest(Sha256::digest(&bytes).into()))
    }
}

/// Hex-encoded SHA-256 commitment to a snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateDigest([u8; 32]);

impl StateDigest {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateDigest({})", self.to_hex())
    }
}

impl Serialize for StateDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for StateDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_collections_default_to_empty() {
        let state: GameState = serde_json::from_value(json!({ "id": "game-1" })).unwrap();
        assert!(state.players.is_empty());
        assert!(state.proposals.is_empty());
        assert!(state.votes.is_empty());
        assert_eq!(state.turn, None);
        assert_eq!(state.economy, None);
    }

    #[test]
    fn absent_sections_stay_absent() {
        let raw = json!({ "id": "game-1", "players": [], "proposals": [], "votes": [] });
        let state: GameState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "game-1",
            "name": "Test Game",
            "players": [{ "id": "p1", "displayName": "Alice", "party": "green" }],
            "proposals": [],
            "votes": [],
            "economy": { "treasury": 100, "inflationRate": 0.01, "unemploymentRate": 0.02 },
            "turn": { "turnNumber": 1, "phase": "voting" },
            "createdAt": "2024-01-01T00:00:00Z",
            "region": "north"
        });

        let state: GameState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.extra.get("region"), Some(&json!("north")));
        assert_eq!(state.players[0].extra.get("party"), Some(&json!("green")));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn digest_ignores_updated_at() {
        let mut a = GameState::new("game-1");
        let mut b = a.clone();
        a.updated_at = Some(Timestamp::from_millis(1));
        b.updated_at = Some(Timestamp::from_millis(2));
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());

        b.name = Some("Renamed".to_string());
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn digest_hex_round_trips() {
        let digest = GameState::new("game-1").digest().unwrap();
        assert_eq!(StateDigest::from_hex(&digest.to_hex()).unwrap(), digest);
        assert_eq!(digest.to_hex().len(), 64);
    }
}
