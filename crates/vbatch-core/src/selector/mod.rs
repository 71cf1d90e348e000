//! Fair weighted random selection over candidate groups.
//!
//! Each pick favours items that have been used less, stops offering an item
//! once it reaches the usage cap (until its whole group is exhausted and
//! reset), and avoids the most recent picks whenever an alternative exists.

mod fair;
mod group;
mod persist;
mod state;

pub use fair::{FairSelector, DEFAULT_RECENCY_WINDOW, DEFAULT_USAGE_CAP};
pub use group::CandidateGroup;
pub use persist::{default_usage_path, PersistedSelector};
pub use state::{RecencyWindow, UsageState};

#[cfg(test)]
mod tests;
