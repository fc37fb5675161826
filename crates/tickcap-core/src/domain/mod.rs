//! Domain models shared across the capture pipeline.

mod models;
mod symbol;
mod timestamp;

pub use models::{Instrument, Observation};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
