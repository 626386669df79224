//! loiter-core: OpenSky states filtering and loiter detection.
//!
//! No async, no network — just the per-poll filter and the rolling presence
//! tracker. `loiter-watch` does the polling and output.

pub mod category;
pub mod config;
pub mod states;
pub mod tracker;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{BoundingBox, Credentials};
pub use states::{parse_states, NotableSighting, Snapshot, StateRecord};
pub use tracker::{advance, LoiterTracker, PresenceHistory};
pub use types::*;
