// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture counters shared between the pipeline and whoever reports on it.

use std::sync::atomic::{AtomicU64, Ordering};

use nectacam_enhance::DispatchOutcome;

/// Lock-free running totals for processed captures.
#[derive(Debug, Default)]
pub struct CaptureStats {
    processed: AtomicU64,
    equalized: AtomicU64,
    stretched: AtomicU64,
    identity: AtomicU64,
    degenerate_fallbacks: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`CaptureStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub equalized: u64,
    pub stretched: u64,
    pub identity: u64,
    pub degenerate_fallbacks: u64,
    pub failures: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a capture that made it all the way to the gallery.
    pub fn record(&self, outcome: DispatchOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Equalized => &self.equalized,
            DispatchOutcome::Stretched => &self.stretched,
            DispatchOutcome::Identity => &self.identity,
            DispatchOutcome::DegenerateFallback => &self.degenerate_fallbacks,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            equalized: self.equalized.load(Ordering::Relaxed),
            stretched: self.stretched.load(Ordering::Relaxed),
            identity: self.identity.load(Ordering::Relaxed),
            degenerate_fallbacks: self.degenerate_fallbacks.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed={} equalized={} stretched={} identity={} degenerate_fallbacks={} failures={}",
            self.processed,
            self.equalized,
            self.stretched,
            self.identity,
            self.degenerate_fallbacks,
            self.failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_land_in_their_counter() {
        let stats = CaptureStats::new();
        stats.record(DispatchOutcome::Equalized);
        stats.record(DispatchOutcome::Equalized);
        stats.record(DispatchOutcome::DegenerateFallback);
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.processed, 3);
        assert_eq!(snap.equalized, 2);
        assert_eq!(snap.degenerate_fallbacks, 1);
        assert_eq!(snap.stretched, 0);
        assert_eq!(snap.failures, 1);
    }

    #[test]
    fn snapshot_display_lists_every_counter() {
        let line = StatsSnapshot::default().to_string();
        assert_eq!(
            line,
            "processed=0 equalized=0 stretched=0 identity=0 degenerate_fallbacks=0 failures=0"
        );
    }
}
