//! Cycle driver: poll → track → emit → sleep, until shutdown.
//!
//! `Watch` owns all state that outlives a cycle: the tracker, the output
//! sink, and the run counters. A cycle's tracker update runs synchronously
//! after the poll resolves, so shutdown can only land between cycles or
//! while a poll is in flight, never halfway through an update.

use std::collections::BTreeSet;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use loiter_core::states::Snapshot;
use loiter_core::tracker::LoiterTracker;

use crate::fetch::{FetchError, StateSource};

/// Counters reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub cycles: u64,
    /// Raw state vectors seen across all polls, qualifying or not.
    pub records: u64,
    pub failed_polls: u64,
    pub reports: u64,
}

pub struct Watch<W: Write> {
    tracker: LoiterTracker,
    out: W,
    stats: WatchStats,
}

impl<W: Write> Watch<W> {
    pub fn new(threshold: i32, out: W) -> Self {
        Watch {
            tracker: LoiterTracker::new(threshold),
            out,
            stats: WatchStats::default(),
        }
    }

    pub fn stats(&self) -> WatchStats {
        self.stats
    }

    pub fn tracker(&self) -> &LoiterTracker {
        &self.tracker
    }

    /// Apply one poll outcome. A failed poll counts as a cycle in which
    /// nothing was seen. Returns the identifiers reported this cycle.
    pub fn cycle(&mut self, outcome: Result<Snapshot, FetchError>) -> BTreeSet<String> {
        let snapshot = match outcome {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "poll failed, treating cycle as empty");
                self.stats.failed_polls += 1;
                Snapshot::empty()
            }
        };

        self.stats.cycles += 1;
        self.stats.records += snapshot.records as u64;

        if tracing::enabled!(tracing::Level::TRACE) {
            match serde_json::to_string(&snapshot) {
                Ok(js) => trace!(snapshot = %js, "poll result"),
                Err(e) => trace!(error = %e, "could not serialize snapshot"),
            }
        }

        if snapshot.skipped > 0 {
            debug!(skipped = snapshot.skipped, "unreadable state vectors");
        }
        for sighting in &snapshot.notable {
            info!(
                icao24 = %sighting.icao24,
                category = sighting.category,
                "{}",
                sighting.description
            );
        }

        let loitering = self.tracker.advance(&snapshot.qualifying);
        for icao24 in &loitering {
            self.emit(icao24);
        }
        self.stats.reports += loitering.len() as u64;

        debug!(
            time = snapshot.time,
            qualifying = snapshot.qualifying.len(),
            tracked = self.tracker.len(),
            reported = loitering.len(),
            "cycle complete"
        );
        loitering
    }

    fn emit(&mut self, icao24: &str) {
        let written = writeln!(self.out, "{icao24}").and_then(|_| self.out.flush());
        if let Err(e) = written {
            warn!(icao24, error = %e, "could not write report");
        }
    }

    /// Flush the sink and hand back the counters.
    pub fn finish(mut self) -> WatchStats {
        if let Err(e) = self.out.flush() {
            warn!(error = %e, "could not flush output");
        }
        self.stats
    }
}

/// Poll `source` every `interval` until `shutdown` resolves.
///
/// The first poll happens immediately. `shutdown` is checked before each
/// poll, during the poll, and during the sleep.
pub async fn run<W, S, F>(watch: &mut Watch<W>, source: &S, interval: Duration, shutdown: F)
where
    W: Write,
    S: StateSource + Sync,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            outcome = source.poll() => outcome,
        };

        watch.cycle(outcome);

        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = ctrl_c() => info!("received SIGINT, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        info!("received SIGINT, shutting down");
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for SIGINT");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
