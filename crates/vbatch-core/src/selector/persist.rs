//! Persist selector state to disk (JSON under XDG state dir) so fairness carries across runs.

use anyhow::{Context, Result};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::path::{Path, PathBuf};

use super::fair::FairSelector;

/// Serializable snapshot of usage counts and the recency window (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct PersistedSelector<T> {
    #[serde(default = "default_version")]
    pub version: u8,
    pub usage: Vec<(T, u32)>,
    #[serde(default)]
    pub recent: Vec<T>,
}

fn default_version() -> u8 {
    1
}

/// Default path for the composer's usage file: `~/.local/state/vbatch/usage.json`.
pub fn default_usage_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vbatch")?;
    Ok(xdg_dirs.get_state_home().join("vbatch").join("usage.json"))
}

impl<T, R> FairSelector<T, R>
where
    T: Eq + Hash + Clone + Ord,
    R: Rng,
{
    /// Build a snapshot. Entries are sorted so the file diffs cleanly between runs.
    pub fn to_snapshot(&self) -> PersistedSelector<T> {
        let mut usage: Vec<(T, u32)> = self
            .usage
            .iter()
            .map(|(item, count)| (item.clone(), count))
            .collect();
        usage.sort();
        PersistedSelector {
            version: 1,
            usage,
            recent: self.recent.iter().cloned().collect(),
        }
    }

    /// Replace current state with a snapshot. Cap and window size stay as configured;
    /// only the newest entries that fit the window are kept.
    pub fn restore_snapshot(&mut self, snapshot: PersistedSelector<T>) {
        self.reset();
        for (item, count) in snapshot.usage {
            if count > 0 {
                self.usage.set(item, count);
            }
        }
        let skip = snapshot.recent.len().saturating_sub(self.recent.capacity());
        for item in snapshot.recent.into_iter().skip(skip) {
            self.recent.push(item);
        }
    }
}

impl<T, R> FairSelector<T, R>
where
    T: Eq + Hash + Clone + Ord + Serialize + DeserializeOwned,
    R: Rng,
{
    /// Save current state to the given path (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let snapshot = self.to_snapshot();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&snapshot).context("serialize usage state")?;
        std::fs::write(path, json)
            .with_context(|| format!("write usage state: {}", path.display()))?;
        Ok(())
    }

    /// Load state from the given path. Returns `Ok(false)` and leaves state untouched
    /// if the file does not exist.
    pub fn load_from_path(&mut self, path: &Path) -> Result<bool> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(e).with_context(|| format!("read usage state: {}", path.display()))
            }
        };
        let snapshot: PersistedSelector<T> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse usage state: {}", path.display()))?;
        self.restore_snapshot(snapshot);
        Ok(true)
    }
}
