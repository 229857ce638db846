//! Core data models for the versus board.

mod history;
mod ids;
mod record;
mod snapshot;
mod summary;

pub use history::*;
pub use ids::*;
pub use record::*;
pub use snapshot::*;
pub use summary::*;
