//! OpenSky `/states/all` response parsing and per-poll qualification.
//!
//! Pure logic — the caller performs the HTTP request and hands the body over.
//! A poll yields a `Snapshot`: the identifiers that are airborne and freshly
//! reporting, plus any notable-category sightings for logging.
//!
//! State vectors are unlabelled arrays. Only these columns are read:
//!
//! | idx | field          |
//! |-----|----------------|
//! | 0   | icao24         |
//! | 4   | last_contact   |
//! | 8   | on_ground      |
//! | 17  | category (opt) |

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::category::{self, CATEGORY_NONE};
use crate::types::{LoiterError, Result, STALE_AFTER_SECS};

const COL_ICAO24: usize = 0;
const COL_LAST_CONTACT: usize = 4;
const COL_ON_GROUND: usize = 8;
const COL_CATEGORY: usize = 17;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// The slice of a state vector the tracker cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub icao24: String,
    pub last_contact: i64,
    pub on_ground: bool,
    pub category: u8,
}

impl StateRecord {
    /// Extract a record from one state vector.
    ///
    /// Returns `None` if the row is not an array or any of the required
    /// columns is missing or mistyped. A short row without a category column
    /// still parses, with `CATEGORY_NONE`.
    pub fn from_row(row: &Value) -> Option<Self> {
        let cols = row.as_array()?;
        let icao24 = cols.get(COL_ICAO24)?.as_str()?.trim().to_string();
        if icao24.is_empty() {
            return None;
        }
        let last_contact = as_epoch(cols.get(COL_LAST_CONTACT)?)?;
        let on_ground = cols.get(COL_ON_GROUND)?.as_bool()?;
        let category = cols
            .get(COL_CATEGORY)
            .and_then(Value::as_u64)
            .and_then(|c| u8::try_from(c).ok())
            .unwrap_or(CATEGORY_NONE);

        Some(StateRecord {
            icao24,
            last_contact,
            on_ground,
            category,
        })
    }

    /// Seconds between the poll time and this record's last contact.
    /// Saturates on out-of-range timestamps, so garbage reads as stale.
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_contact)
    }

    pub fn is_stale(&self, now: i64) -> bool {
        self.age(now) >= STALE_AFTER_SECS
    }

    /// Airborne and heard from within the stale window.
    pub fn is_active(&self, now: i64) -> bool {
        !self.on_ground && !self.is_stale(now)
    }
}

fn as_epoch(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An aircraft in a notable emitter category, seen in this poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotableSighting {
    pub icao24: String,
    pub category: u8,
    pub description: &'static str,
}

/// Result of a single poll.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Poll time reported by the server (epoch seconds).
    pub time: i64,
    /// Identifiers airborne and reporting within the stale window.
    pub qualifying: HashSet<String>,
    pub notable: Vec<NotableSighting>,
    /// Raw state vectors in the response, qualifying or not.
    pub records: usize,
    /// State vectors that could not be read.
    pub skipped: usize,
}

impl Snapshot {
    /// An empty cycle: nothing seen, nothing counted.
    pub fn empty() -> Self {
        Snapshot::default()
    }
}

/// Parse a `/states/all` response body.
pub fn parse_states(body: &str) -> Result<Snapshot> {
    let js: Value = serde_json::from_str(body)?;
    snapshot_from_value(&js)
}

/// Build a snapshot from an already-decoded response.
///
/// `time` and `states` must both be present. `states: null` is an empty
/// airspace, not an error.
pub fn snapshot_from_value(js: &Value) -> Result<Snapshot> {
    let time = js
        .get("time")
        .ok_or(LoiterError::MissingField("time"))
        .and_then(|v| as_epoch(v).ok_or(LoiterError::InvalidField("time")))?;

    let rows: &[Value] = match js.get("states") {
        None => return Err(LoiterError::MissingField("states")),
        Some(Value::Null) => &[],
        Some(Value::Array(rows)) => rows,
        Some(_) => return Err(LoiterError::InvalidField("states")),
    };

    let mut snapshot = Snapshot {
        time,
        records: rows.len(),
        ..Snapshot::default()
    };

    for row in rows {
        let record = match StateRecord::from_row(row) {
            Some(r) => r,
            None => {
                snapshot.skipped += 1;
                continue;
            }
        };

        if category::is_notable(record.category) {
            snapshot.notable.push(NotableSighting {
                icao24: record.icao24.clone(),
                category: record.category,
                description: category::describe(record.category).unwrap_or("Unknown"),
            });
        }

        if record.is_active(time) {
            snapshot.qualifying.insert(record.icao24);
        }
    }

    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    /// Full-width state vector as OpenSky sends it.
    fn row(icao: &str, last_contact: i64, on_ground: bool, category: u8) -> Value {
        json!([
            icao, "TEST123 ", "United States", last_contact, last_contact,
            -82.5, 35.5, 1000.0, on_ground, 50.0, 90.0, 0.0,
            null, 1050.0, "1200", false, 0, category
        ])
    }

    fn body(states: Value) -> String {
        body_at(NOW, states)
    }

    fn body_at(time: i64, states: Value) -> String {
        json!({ "time": time, "states": states }).to_string()
    }

    #[test]
    fn test_active_record_qualifies() {
        let snap = parse_states(&body(json!([row("abc123", NOW - 10, false, 1)]))).unwrap();
        assert_eq!(snap.time, NOW);
        assert!(snap.qualifying.contains("abc123"));
        assert_eq!(snap.records, 1);
        assert_eq!(snap.skipped, 0);
    }

    #[test]
    fn test_on_ground_excluded() {
        let snap = parse_states(&body(json!([row("abc123", NOW, true, 1)]))).unwrap();
        assert!(snap.qualifying.is_empty());
        assert_eq!(snap.records, 1);
    }

    #[test]
    fn test_stale_boundary_is_exclusive() {
        let states = json!([
            row("aaa111", NOW - 299, false, 0),
            row("bbb222", NOW - 300, false, 0),
            row("ccc333", NOW - 301, false, 0),
        ]);
        let snap = parse_states(&body(states)).unwrap();
        assert!(snap.qualifying.contains("aaa111"));
        assert!(!snap.qualifying.contains("bbb222"));
        assert!(!snap.qualifying.contains("ccc333"));
        assert_eq!(snap.records, 3);
    }

    #[test]
    fn test_null_states_is_empty() {
        let snap = parse_states(&body(Value::Null)).unwrap();
        assert!(snap.qualifying.is_empty());
        assert!(snap.notable.is_empty());
        assert_eq!(snap.records, 0);
    }

    #[test]
    fn test_missing_top_level_fields() {
        let err = parse_states(r#"{"states": []}"#).unwrap_err();
        assert!(matches!(err, LoiterError::MissingField("time")));

        let err = parse_states(r#"{"time": 1700000000}"#).unwrap_err();
        assert!(matches!(err, LoiterError::MissingField("states")));

        let err = parse_states(r#"{"time": 1700000000, "states": "nope"}"#).unwrap_err();
        assert!(matches!(err, LoiterError::InvalidField("states")));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_states("<html>Too Many Requests</html>").unwrap_err();
        assert!(matches!(err, LoiterError::Json(_)));
    }

    #[test]
    fn test_missing_category_defaults_to_none() {
        // 17-column vector, as served before the category field existed
        let short = json!([
            "abc123", "N123  ", "United States", NOW, NOW,
            -82.5, 35.5, 1000.0, false, 50.0, 90.0, 0.0,
            null, 1050.0, "1200", false, 0
        ]);
        let record = StateRecord::from_row(&short).unwrap();
        assert_eq!(record.category, CATEGORY_NONE);

        let snap = parse_states(&body(json!([short]))).unwrap();
        assert!(snap.qualifying.contains("abc123"));
    }

    #[test]
    fn test_unreadable_rows_skipped() {
        let states = json!([
            "not a row",
            ["abc123"],
            [null, "X", "Y", NOW, NOW, 0.0, 0.0, 0.0, false],
            row("def456", NOW, false, 0),
        ]);
        let snap = parse_states(&body(states)).unwrap();
        assert_eq!(snap.records, 4);
        assert_eq!(snap.skipped, 3);
        assert_eq!(snap.qualifying.len(), 1);
        assert!(snap.qualifying.contains("def456"));
    }

    #[test]
    fn test_notable_reported_regardless_of_qualification() {
        let states = json!([
            row("0d0001", NOW, false, 14),  // UAV, airborne
            row("0d0002", NOW, true, 11),   // skydiver, on the ground
            row("0d0003", NOW - 900, false, 15), // space, stale
            row("0d0004", NOW, false, 8),   // rotorcraft, not notable
        ]);
        let snap = parse_states(&body(states)).unwrap();

        let ids: Vec<&str> = snap.notable.iter().map(|n| n.icao24.as_str()).collect();
        assert_eq!(ids, vec!["0d0001", "0d0002", "0d0003"]);
        assert_eq!(snap.notable[0].description, "Unmanned Aerial Vehicle");

        // Tracking is unaffected by the side channel
        assert_eq!(snap.qualifying.len(), 2);
        assert!(snap.qualifying.contains("0d0001"));
        assert!(snap.qualifying.contains("0d0004"));
    }

    #[test]
    fn test_float_timestamps_accepted() {
        let js = json!({ "time": NOW as f64, "states": [row("abc123", NOW, false, 0)] });
        let snap = snapshot_from_value(&js).unwrap();
        assert_eq!(snap.time, NOW);
        assert_eq!(snap.qualifying.len(), 1);
    }

    #[test]
    fn test_out_of_range_timestamps_are_stale() {
        let body = r#"{"time": 1e300, "states": [["abc123",null,null,0,-1,0,0,0,false]]}"#;
        let snap = parse_states(body).unwrap();
        assert_eq!(snap.time, i64::MAX);
        assert!(snap.qualifying.is_empty());
        assert_eq!(snap.records, 1);

        let states = json!([row("abc123", i64::MIN, false, 0)]);
        let snap = parse_states(&body_at(NOW, states)).unwrap();
        assert!(snap.qualifying.is_empty());

        let record = StateRecord::from_row(&row("abc123", i64::MIN, false, 0)).unwrap();
        assert_eq!(record.age(NOW), i64::MAX);
        assert!(record.is_stale(NOW));
    }

    #[test]
    fn test_snapshot_serializes() {
        let snap = parse_states(&body(json!([row("0d0001", NOW, false, 14)]))).unwrap();
        let js = serde_json::to_value(&snap).unwrap();
        assert_eq!(js["time"], NOW);
        assert_eq!(js["qualifying"], json!(["0d0001"]));
        assert_eq!(js["notable"][0]["category"], 14);
        assert_eq!(js["notable"][0]["description"], "Unmanned Aerial Vehicle");
        assert_eq!(js["records"], 1);
    }

    #[test]
    fn test_duplicate_identifiers_collapse() {
        let states = json!([row("abc123", NOW, false, 0), row("abc123", NOW, false, 0)]);
        let snap = parse_states(&body(states)).unwrap();
        assert_eq!(snap.records, 2);
        assert_eq!(snap.qualifying.len(), 1);
    }
}
