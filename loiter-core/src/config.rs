//! Credentials and query-area configuration.
//!
//! Credentials come from `~/.opensky`, a single `username:password` line.
//! Prompting for a password is left to the binary.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::{LoiterError, Result};

/// Dotfile name under the home directory.
pub const DOTFILE_NAME: &str = ".opensky";

/// OpenSky basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Latitude/longitude box passed to `/states/all`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lamax: f64,
    pub lomin: f64,
    pub lomax: f64,
}

impl BoundingBox {
    pub fn new(lamin: f64, lamax: f64, lomin: f64, lomax: f64) -> Self {
        BoundingBox {
            lamin,
            lamax,
            lomin,
            lomax,
        }
    }

    /// Query parameters in the order the API documents them.
    pub fn query(&self) -> [(&'static str, f64); 4] {
        [
            ("lamin", self.lamin),
            ("lamax", self.lamax),
            ("lomin", self.lomin),
            ("lomax", self.lomax),
        ]
    }

    /// Min/max in the right order and within valid coordinate ranges.
    /// An unordered box is still sent; the API just returns nothing.
    pub fn is_valid(&self) -> bool {
        let lat_ok = (-90.0..=90.0).contains(&self.lamin) && (-90.0..=90.0).contains(&self.lamax);
        let lon_ok =
            (-180.0..=180.0).contains(&self.lomin) && (-180.0..=180.0).contains(&self.lomax);
        lat_ok && lon_ok && self.lamin <= self.lamax && self.lomin <= self.lomax
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {}..{}, lon {}..{}",
            self.lamin, self.lamax, self.lomin, self.lomax
        )
    }
}

// ---------------------------------------------------------------------------
// Dotfile
// ---------------------------------------------------------------------------

/// Path of the credentials dotfile (`~/.opensky`).
pub fn dotfile_path() -> PathBuf {
    dirs_home().join(DOTFILE_NAME)
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Read credentials from a dotfile. Only the first line is used.
pub fn load_dotfile(path: &Path) -> Result<Credentials> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        LoiterError::Credentials(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_credentials(&text)
}

/// Parse `username:password` from the first line of `text`.
///
/// Surrounding whitespace is stripped; the split is at the first `:` so the
/// password may itself contain colons.
pub fn parse_credentials(text: &str) -> Result<Credentials> {
    let line = text
        .lines()
        .next()
        .map(|l| l.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n')))
        .unwrap_or("");

    match line.split_once(':') {
        Some((user, pass)) => Ok(Credentials::new(user, pass)),
        None => Err(LoiterError::Credentials(
            "expected a single username:password line".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
