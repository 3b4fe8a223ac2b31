//! Cache Statistics Module
//!
//! Tracks conditional-request outcomes, token generations and invalidations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Lock-free counters shared by the gate, trigger and generator paths.
#[derive(Debug, Default)]
pub struct StatsCounters {
    short_circuits: AtomicU64,
    pass_throughs: AtomicU64,
    generations: AtomicU64,
    generation_failures: AtomicU64,
    invalidations: AtomicU64,
    skipped_invalidations: AtomicU64,
}

impl StatsCounters {
    /// Creates a new set of counters, all at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_short_circuit(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass_through(&self) {
        self.pass_throughs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a failed mutation that left its token in place.
    pub fn record_skipped_invalidation(&self) {
        self.skipped_invalidations.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, total_tokens: usize) -> CacheStats {
        CacheStats {
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
            pass_throughs: self.pass_throughs.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            skipped_invalidations: self.skipped_invalidations.load(Ordering::Relaxed),
            total_tokens,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Requests answered with 304 Not Modified
    pub short_circuits: u64,
    /// Conditional checks forwarded to normal handling
    pub pass_throughs: u64,
    /// Tokens generated or derived from response bodies
    pub generations: u64,
    /// Token generations that failed or timed out
    pub generation_failures: u64,
    /// Tokens cleared after successful mutations
    pub invalidations: u64,
    /// Failed mutations that left tokens untouched
    pub skipped_invalidations: u64,
    /// Identities currently holding a token
    pub total_tokens: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Share of conditional checks that short-circuited.
    ///
    /// Returns 0.0 if no checks have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.short_circuits + self.pass_throughs;
        if total == 0 {
            0.0
        } else {
            self.short_circuits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounters::new().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = StatsCounters::new().snapshot(0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::new();
        counters.record_short_circuit();
        counters.record_short_circuit();
        counters.record_short_circuit();
        counters.record_pass_through();

        assert_eq!(counters.snapshot(0).hit_rate(), 0.75);
    }

    #[test]
    fn test_record_invalidations() {
        let counters = StatsCounters::new();
        counters.record_invalidation();
        counters.record_invalidation();
        counters.record_skipped_invalidation();

        let stats = counters.snapshot(3);
        assert_eq!(stats.invalidations, 2);
        assert_eq!(stats.skipped_invalidations, 1);
        assert_eq!(stats.total_tokens, 3);
    }

    #[test]
    fn test_record_generations() {
        let counters = StatsCounters::new();
        counters.record_generation();
        counters.record_generation_failure();

        let stats = counters.snapshot(0);
        assert_eq!(stats.generations, 1);
        assert_eq!(stats.generation_failures, 1);
    }
}
