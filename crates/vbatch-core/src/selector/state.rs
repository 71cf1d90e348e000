//! Usage counts and the recency window owned by the selector.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Per-item usage counts. Missing items count as 0.
#[derive(Debug, Clone)]
pub struct UsageState<T> {
    counts: HashMap<T, u32>,
}

impl<T> Default for UsageState<T> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> UsageState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: &T) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    pub(super) fn increment(&mut self, item: &T) {
        *self.counts.entry(item.clone()).or_insert(0) += 1;
    }

    pub(super) fn set(&mut self, item: T, count: u32) {
        self.counts.insert(item, count);
    }

    /// Reset the given items to 0. Other items keep their counts.
    pub(super) fn reset_items<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in items {
            self.counts.remove(item);
        }
    }

    pub(super) fn clear(&mut self) {
        self.counts.clear();
    }

    /// Items with a non-zero count.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> {
        self.counts
            .iter()
            .filter(|(_, c)| **c > 0)
            .map(|(item, c)| (item, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// FIFO of the last `capacity` picks. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct RecencyWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: PartialEq> RecencyWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.entries.contains(item)
    }

    pub(super) fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(item);
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}
