//! Stats backend for finished sessions: per-player history, profile
//! aggregation and JSON persistence.

pub use error::*;
pub use file::*;
pub use queue::*;
pub use store::*;

mod error;
mod file;
mod queue;
mod store;
