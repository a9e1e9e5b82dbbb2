//! File-based repository implementations.
//!
//! Game ids are hex-encoded into file names, so any id string maps to a
//! portable, collision-free path.

mod audit;
mod state;

pub use audit::FileAuditLog;
pub use state::FileGameRepository;

fn encode_id(game_id: &str) -> String {
    hex::encode(game_id.as_bytes())
}

fn decode_id(stem: &str) -> Option<String> {
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_survive_file_name_encoding() {
        for id in ["game-1", "../escape", "ünïcödé", ""] {
            assert_eq!(decode_id(&encode_id(id)).as_deref(), Some(id));
        }
        assert_eq!(decode_id("not-hex"), None);
    }
}
