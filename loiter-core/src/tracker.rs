//! Rolling one-hour presence tracker.
//!
//! Pure logic — no I/O, no clock. Each call to `advance` is one poll cycle:
//! every known aircraft's history shifts by one slot, aircraft that meet the
//! threshold are reported and forgotten, silent aircraft are pruned, and
//! newly seen aircraft get a fresh history.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::types::WINDOW_SLOTS;

// ---------------------------------------------------------------------------
// Presence history
// ---------------------------------------------------------------------------

/// Presence flags for the trailing `WINDOW_SLOTS` polls, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenceHistory([bool; WINDOW_SLOTS]);

impl PresenceHistory {
    /// History for an aircraft first seen this cycle: only the newest slot set.
    pub fn fresh() -> Self {
        let mut slots = [false; WINDOW_SLOTS];
        slots[WINDOW_SLOTS - 1] = true;
        PresenceHistory(slots)
    }

    pub fn from_slots(slots: [bool; WINDOW_SLOTS]) -> Self {
        PresenceHistory(slots)
    }

    /// Drop the oldest slot and append `present` as the newest.
    pub fn shift(&mut self, present: bool) {
        self.0.rotate_left(1);
        self.0[WINDOW_SLOTS - 1] = present;
    }

    /// Number of polls in the window where the aircraft was present.
    pub fn count(&self) -> i32 {
        self.0.iter().filter(|&&p| p).count() as i32
    }

    pub fn slots(&self) -> &[bool; WINDOW_SLOTS] {
        &self.0
    }
}

impl fmt::Display for PresenceHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &p in &self.0 {
            f.write_str(if p { "1" } else { "0" })?;
        }
        Ok(())
    }
}

pub type HistoryMap = HashMap<String, PresenceHistory>;

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Run one cycle over `histories`.
///
/// Returns the updated map and the identifiers whose presence count reached
/// `threshold` this cycle. Removal only applies to entries that existed
/// before the call and runs before insertion, so a reported aircraft that is
/// still overhead restarts with a fresh history. A threshold below 1 reports
/// every tracked identifier.
pub fn advance(
    mut histories: HistoryMap,
    qualifying: &HashSet<String>,
    threshold: i32,
) -> (HistoryMap, BTreeSet<String>) {
    let mut loitering = BTreeSet::new();
    let mut forget = Vec::new();

    for (icao24, history) in histories.iter_mut() {
        history.shift(qualifying.contains(icao24));
        let count = history.count();

        if count >= threshold {
            loitering.insert(icao24.clone());
            forget.push(icao24.clone());
        }
        // Nothing heard for a whole window
        if count <= 0 {
            forget.push(icao24.clone());
        }
    }

    for icao24 in &forget {
        histories.remove(icao24);
    }

    for icao24 in qualifying {
        histories
            .entry(icao24.clone())
            .or_insert_with(PresenceHistory::fresh);
    }

    (histories, loitering)
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Owns the history map and threshold across cycles.
#[derive(Debug, Clone)]
pub struct LoiterTracker {
    histories: HistoryMap,
    threshold: i32,
}

impl LoiterTracker {
    pub fn new(threshold: i32) -> Self {
        LoiterTracker {
            histories: HashMap::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Feed one cycle's qualifying set. Returns identifiers to report, sorted.
    pub fn advance(&mut self, qualifying: &HashSet<String>) -> BTreeSet<String> {
        let histories = std::mem::take(&mut self.histories);
        let (histories, loitering) = advance(histories, qualifying, self.threshold);
        self.histories = histories;
        loitering
    }

    pub fn history(&self, icao24: &str) -> Option<&PresenceHistory> {
        self.histories.get(icao24)
    }

    pub fn histories(&self) -> &HistoryMap {
        &self.histories
    }

    /// Number of aircraft currently tracked.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
