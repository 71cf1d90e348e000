//! CLI command handlers, one file per subcommand.

mod completions;
mod encode;
mod generate;
mod man;
mod probe;
mod usage;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub use completions::run_completions;
pub use encode::{run_encode, EncodeOverrides};
pub use generate::{run_generate, GenerateOptions};
pub use man::run_man;
pub use probe::run_probe;
pub use usage::run_usage;

/// Source directory from the argument or the config; must exist. Returned absolute.
pub(crate) fn resolve_source(arg: Option<PathBuf>, configured: Option<&PathBuf>) -> Result<PathBuf> {
    let Some(dir) = arg.or_else(|| configured.cloned()) else {
        bail!("no source directory given and none set in config (source_dir)");
    };
    if !dir.is_dir() {
        bail!("source directory does not exist: {}", dir.display());
    }
    dir.canonicalize()
        .with_context(|| format!("resolve source directory: {}", dir.display()))
}

/// Output directory from the argument or the config, created if missing. Returned absolute.
pub(crate) fn resolve_output(arg: Option<PathBuf>, configured: Option<&PathBuf>) -> Result<PathBuf> {
    let Some(dir) = arg.or_else(|| configured.cloned()) else {
        bail!("no output directory given and none set in config (output_dir)");
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create output directory: {}", dir.display()))?;
    dir.canonicalize()
        .with_context(|| format!("resolve output directory: {}", dir.display()))
}

/// Shown after a run; `bail`s when any job failed so the exit code reflects it.
pub(crate) fn finish(kind: &str, summary: &vbatch_core::runner::RunSummary, output: &Path) -> Result<()> {
    println!("{}", crate::cli::progress::summary_line(kind, summary));
    if summary.succeeded() > 0 {
        println!("Output: {}", output.display());
    }
    if summary.failed > 0 {
        bail!("{} of {} {} job(s) failed; see log for details", summary.failed, summary.total, kind);
    }
    Ok(())
}
