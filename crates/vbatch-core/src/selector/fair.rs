//! The selector: usage cap, group-scoped reset, recency exclusion, reciprocal weighting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

use super::group::CandidateGroup;
use super::state::{RecencyWindow, UsageState};

/// Default number of picks allowed per item before it waits for a group reset.
pub const DEFAULT_USAGE_CAP: u32 = 3;
/// Default number of recent picks excluded when alternatives exist.
pub const DEFAULT_RECENCY_WINDOW: usize = 10;

/// Stateful weighted-random picker. Usage counts and the recency window live
/// across calls (and across batch runs) until an explicit or exhaustion reset.
///
/// Not synchronized: callers select sequentially, before any job runs.
pub struct FairSelector<T, R = StdRng> {
    pub(super) usage: UsageState<T>,
    pub(super) recent: RecencyWindow<T>,
    pub(super) cap: u32,
    rng: R,
}

impl<T: Eq + Hash + Clone> FairSelector<T, StdRng> {
    /// Selector seeded from OS entropy.
    pub fn new(cap: u32, window: usize) -> Self {
        Self::with_rng(cap, window, StdRng::from_entropy())
    }
}

impl<T: Eq + Hash + Clone> Default for FairSelector<T, StdRng> {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_CAP, DEFAULT_RECENCY_WINDOW)
    }
}

impl<T: Eq + Hash + Clone, R: Rng> FairSelector<T, R> {
    /// Selector with an explicit random source (e.g. a seeded `StdRng` in tests).
    pub fn with_rng(cap: u32, window: usize, rng: R) -> Self {
        Self {
            usage: UsageState::new(),
            recent: RecencyWindow::new(window),
            cap,
            rng,
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Recency window capacity K.
    pub fn window(&self) -> usize {
        self.recent.capacity()
    }

    pub fn usage(&self) -> &UsageState<T> {
        &self.usage
    }

    pub fn recent(&self) -> &RecencyWindow<T> {
        &self.recent
    }

    /// Pick one item from `group`, or `None` if the group has no items.
    ///
    /// The chosen item's count is incremented and it is pushed onto the recency window.
    pub fn select(&mut self, group: &CandidateGroup<T>) -> Option<T> {
        if group.items.is_empty() {
            return None;
        }

        let mut eligible: Vec<&T> = group
            .items
            .iter()
            .filter(|item| self.usage.get(item) < self.cap)
            .collect();
        if eligible.is_empty() {
            tracing::debug!(group = %group.id, items = group.items.len(), "usage cap reached for every item; resetting group");
            self.usage.reset_items(&group.items);
            eligible = group.items.iter().collect();
        }

        let fresh: Vec<&T> = eligible
            .iter()
            .copied()
            .filter(|item| !self.recent.contains(item))
            .collect();
        let candidates = if fresh.is_empty() { eligible } else { fresh };

        let usage = &self.usage;
        let chosen = match candidates
            .choose_weighted(&mut self.rng, |item| weight(usage.get(item)))
        {
            Ok(item) => (*item).clone(),
            // Weights are always finite and positive; keep a pick rather than fail.
            Err(_) => candidates[0].clone(),
        };

        self.usage.increment(&chosen);
        self.recent.push(chosen.clone());
        Some(chosen)
    }

    /// Forget all usage counts and recent picks.
    pub fn reset(&mut self) {
        self.usage.clear();
        self.recent.clear();
    }

    /// Reset usage counts for one group's items only.
    pub fn reset_group(&mut self, group: &CandidateGroup<T>) {
        self.usage.reset_items(&group.items);
    }
}

/// Reciprocal weight: unused items are twice as likely as items used once, and so on.
pub(super) fn weight(count: u32) -> f64 {
    1.0 / (1.0 + f64::from(count))
}
