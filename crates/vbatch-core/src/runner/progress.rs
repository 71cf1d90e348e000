//! Progress reporting for batch runs (completed/total counts and per-job events).
//!
//! Events go out on an unbounded channel so a slow consumer never stalls
//! dispatch; `ProgressCounter` can be polled instead of (or as well as) the channel.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::job::JobStatus;

/// Notification emitted by the runner (per job) and the composer (per empty round).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A job finished. Emitted in completion order.
    JobFinished {
        completed: usize,
        total: usize,
        label: String,
        status: JobStatus,
    },
    /// A compose round selected nothing (every group empty) and produced no job. 1-based.
    RoundSkipped { round: usize },
}

/// Shared completed/total counters, updated by the runner as jobs finish.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
    }

    /// Increment completed; returns the new count.
    pub(super) fn record_completion(&self) -> usize {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Fraction complete in [0.0, 1.0]; an empty run counts as complete.
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        (self.completed() as f64 / total as f64).min(1.0)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job was submitted and ran (successfully or not).
    Completed,
    /// Cancellation was observed while jobs (or rounds) were still unsubmitted.
    Cancelled,
}

/// Totals reported when a run finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs handed to the runner.
    pub total: usize,
    /// Jobs actually dispatched to a worker.
    pub submitted: usize,
    /// Jobs that finished (equals `submitted` once the run returns).
    pub completed: usize,
    pub failed: usize,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            submitted: 0,
            completed: 0,
            failed: 0,
            outcome: RunOutcome::Completed,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.completed.saturating_sub(self.failed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }
}
