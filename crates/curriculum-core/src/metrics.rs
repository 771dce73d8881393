//! Process-wide counters for the optimization loop.
//!
//! Counters are bumped silently at the call site. [`Metrics::flush`] emits
//! the current values as one `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lock-free atomic counters.
pub struct Metrics {
    optimizations_run: AtomicU64,
    iterations_judged: AtomicU64,
    repair_actions_applied: AtomicU64,
    drafts_accepted: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            optimizations_run: AtomicU64::new(0),
            iterations_judged: AtomicU64::new(0),
            repair_actions_applied: AtomicU64::new(0),
            drafts_accepted: AtomicU64::new(0),
        }
    }

    pub fn inc_optimizations(&self) {
        self.optimizations_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "optimizations_run", "counter incremented");
    }

    pub fn inc_iterations(&self) {
        self.iterations_judged.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "iterations_judged", "counter incremented");
    }

    /// Add `count` applied repair actions.
    pub fn add_repair_actions(&self, count: u64) {
        self.repair_actions_applied
            .fetch_add(count, Ordering::Relaxed);
        tracing::trace!(metric = "repair_actions_applied", count, "counter incremented");
    }

    pub fn inc_accepted(&self) {
        self.drafts_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "drafts_accepted", "counter incremented");
    }

    /// Emit all counters as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            optimizations_run = self.optimizations_run(),
            iterations_judged = self.iterations_judged(),
            repair_actions_applied = self.repair_actions_applied(),
            drafts_accepted = self.drafts_accepted(),
        );
    }

    pub fn optimizations_run(&self) -> u64 {
        self.optimizations_run.load(Ordering::Relaxed)
    }

    pub fn iterations_judged(&self) -> u64 {
        self.iterations_judged.load(Ordering::Relaxed)
    }

    pub fn repair_actions_applied(&self) -> u64 {
        self.repair_actions_applied.load(Ordering::Relaxed)
    }

    pub fn drafts_accepted(&self) -> u64 {
        self.drafts_accepted.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.optimizations_run.store(0, Ordering::Relaxed);
        self.iterations_judged.store(0, Ordering::Relaxed);
        self.repair_actions_applied.store(0, Ordering::Relaxed);
        self.drafts_accepted.store(0, Ordering::Relaxed);
    }
}
