//! Source enumeration: media files under a tree (encode) and one candidate
//! group per immediate sub-directory (generate).
//!
//! Roots are expected to be absolute, so every returned path is too. Results
//! are sorted by file name; hidden entries and the output directory are skipped.

use anyhow::Result;
use std::path::{Path, PathBuf};
use vbatch_core::config::VbatchConfig;
use vbatch_core::selector::CandidateGroup;
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

fn is_media(cfg: &VbatchConfig, path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| cfg.is_media_extension(e))
        .unwrap_or(false)
}

/// Entries under `root` down to `max_depth`, minus hidden entries and `exclude`.
/// Unreadable entries are logged and skipped.
fn walk<'a>(
    root: &Path,
    max_depth: usize,
    exclude: Option<&'a Path>,
) -> impl Iterator<Item = DirEntry> + 'a {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !is_hidden(e) && exclude.map_or(true, |x| e.path() != x))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
}

/// Every media file below `root`, recursively.
pub fn media_files(root: &Path, cfg: &VbatchConfig, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = walk(root, usize::MAX, exclude)
        .filter(|e| e.file_type().is_file() && is_media(cfg, e.path()))
        .map(DirEntry::into_path)
        .collect();
    tracing::debug!(root = %root.display(), files = files.len(), "scanned media files");
    Ok(files)
}

/// One group per immediate sub-directory of `parent`, holding that directory's
/// own media files (not nested ones). Groups come out in name order; a
/// sub-directory without media files yields an empty group.
pub fn candidate_groups(
    parent: &Path,
    cfg: &VbatchConfig,
    exclude: Option<&Path>,
) -> Result<Vec<CandidateGroup<PathBuf>>> {
    let groups: Vec<CandidateGroup<PathBuf>> = walk(parent, 1, exclude)
        .filter(|e| e.file_type().is_dir())
        .map(|dir| {
            let items = walk(dir.path(), 1, None)
                .filter(|e| e.file_type().is_file() && is_media(cfg, e.path()))
                .map(DirEntry::into_path)
                .collect();
            CandidateGroup::new(dir.file_name().to_string_lossy(), items)
        })
        .collect();
    for g in &groups {
        tracing::debug!(group = %g.id, items = g.len(), "candidate group");
    }
    Ok(groups)
}
