//! `vbatch usage` – list or clear the composer's saved usage counts.

use anyhow::{Context, Result};
use std::path::PathBuf;
use vbatch_core::config::VbatchConfig;
use vbatch_core::selector::{default_usage_path, FairSelector};

pub fn run_usage(cfg: &VbatchConfig, reset: bool) -> Result<()> {
    let path = default_usage_path()?;
    if reset {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "usage state cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("remove usage state: {}", path.display()))
            }
        }
        println!("Usage counts cleared.");
        return Ok(());
    }

    let mut selector: FairSelector<PathBuf> =
        FairSelector::new(cfg.compose.usage_cap, cfg.compose.recency_window);
    if !selector.load_from_path(&path)? {
        println!("No usage recorded yet.");
        return Ok(());
    }
    let snapshot = selector.to_snapshot();
    if snapshot.usage.is_empty() {
        println!("No usage recorded yet.");
        return Ok(());
    }
    println!("{:<6} {}", "COUNT", "FILE");
    for (item, count) in &snapshot.usage {
        println!("{:<6} {}", count, item.display());
    }
    println!(
        "{} clip(s) used; {} in the recent window (cap {}).",
        snapshot.usage.len(),
        snapshot.recent.len(),
        selector.cap()
    );
    Ok(())
}
