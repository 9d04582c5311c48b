//! vPIC reference snapshot
//!
//! This module contains the reader for the bundled vPIC database image and
//! the immutable in-memory snapshot the decoder queries.

pub mod records;
pub mod store;

mod sqlite;

// Re-export key types for convenience
pub use records::{ElementRecord, PatternRecord, SnapshotStats, WmiRecord};
pub use store::Snapshot;
