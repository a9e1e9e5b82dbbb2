pub mod common;
pub mod player;
pub mod proposal;
pub mod turn;
pub mod vote;

pub use common::{PlayerId, ProposalId, Timestamp, is_truthy};
pub use player::Player;
pub use proposal::{Proposal, ProposalStatus};
pub use turn::{Economy, TurnInfo};
pub use vote::{Vote, VoteChoice};
