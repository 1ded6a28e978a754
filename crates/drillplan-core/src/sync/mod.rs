//! Daily synchronization.
//!
//! Reads an edited plan document back into progress state. The engine works
//! on a copy; the caller persists it with one atomic save.

pub mod sync_engine;
pub mod types;


pub use sync_engine::SyncEngine;
pub use types::{SyncOutcome, SyncReport, SyncTotals};
