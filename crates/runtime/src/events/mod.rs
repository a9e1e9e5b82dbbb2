//! Topic-based event bus for runtime events.
//!
//! Workers publish one [`StepEvent`] per applied step and one
//! [`ResolutionEvent`] per proposal finalised by that step. Consumers
//! subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{ResolutionEvent, StepEvent};
