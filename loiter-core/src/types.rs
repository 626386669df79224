//! Shared types, error enum, and timing constants for loiter-core.

use thiserror::Error;

/// All errors produced by loiter-core.
#[derive(Debug, Error)]
pub enum LoiterError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response missing field `{0}`")]
    MissingField(&'static str),
    #[error("response field `{0}` has unexpected type")]
    InvalidField(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credentials error: {0}")]
    Credentials(String),
}

pub type Result<T> = std::result::Result<T, LoiterError>;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Seconds between polls. One presence slot covers one poll.
pub const POLL_INTERVAL_SECS: u64 = 300;

/// Presence slots per history: one hour of 5-minute polls.
pub const WINDOW_SLOTS: usize = 12;

/// Records whose last contact is this many seconds old (or older) are stale.
pub const STALE_AFTER_SECS: i64 = 300;

/// Slots out of `WINDOW_SLOTS` needed to count as loitering.
pub const DEFAULT_LOITER_COUNT: i32 = 4;

/// Per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
