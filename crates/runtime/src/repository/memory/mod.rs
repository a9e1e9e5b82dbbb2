//! In-memory repository implementations for testing and development.

mod audit;
mod state;

pub use audit::InMemoryAuditLog;
pub use state::InMemoryGameRepo;
