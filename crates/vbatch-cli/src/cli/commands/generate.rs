//! `vbatch generate` – compose N outputs from one fair pick per sub-directory.

use anyhow::{bail, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use vbatch_core::compose::{self, ComposeRequest, OutputNaming};
use vbatch_core::config::VbatchConfig;
use vbatch_core::control::RunControl;
use vbatch_core::runner::ProcessExecutor;
use vbatch_core::selector::{default_usage_path, FairSelector};

use super::{finish, resolve_output, resolve_source};
use crate::cli::{progress, scan};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub rounds: usize,
    pub prefix: Option<String>,
    pub jobs: Option<usize>,
    /// Start from empty usage counts instead of the saved ones.
    pub fresh: bool,
}

pub async fn run_generate(
    cfg: &VbatchConfig,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    options: GenerateOptions,
) -> Result<()> {
    if options.rounds == 0 {
        bail!("--rounds must be at least 1");
    }
    let parent = resolve_source(source, cfg.source_dir.as_ref())?;
    let output = resolve_output(output, cfg.output_dir.as_ref())?;
    let prefix = options
        .prefix
        .unwrap_or_else(|| cfg.compose.output_prefix.clone());

    let groups = scan::candidate_groups(&parent, cfg, Some(&output))?;
    if groups.iter().all(|g| g.is_empty()) {
        println!(
            "No media files in any sub-directory of {}; every round will be skipped.",
            parent.display()
        );
    }

    let mut selector: FairSelector<PathBuf> =
        FairSelector::new(cfg.compose.usage_cap, cfg.compose.recency_window);
    let usage_path = default_usage_path()?;
    if options.fresh {
        tracing::info!("ignoring saved usage counts for this run");
    } else {
        match selector.load_from_path(&usage_path) {
            Ok(true) => tracing::debug!(path = %usage_path.display(), "loaded usage state"),
            Ok(false) => {}
            Err(e) => tracing::warn!("usage state unreadable, starting fresh: {:#}", e),
        }
    }

    let request = ComposeRequest {
        rounds: options.rounds,
        parallelism: options.jobs.unwrap_or(cfg.parallelism),
        naming: OutputNaming::new(output.clone(), prefix),
        ffmpeg: OsString::from(&cfg.ffmpeg_path),
    };
    println!(
        "Generating {} output(s) from {} group(s) ({} at a time)...",
        request.rounds,
        groups.len(),
        request.parallelism
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let control = RunControl::new().with_events(tx);
    let printer = progress::spawn_printer(rx);
    let interrupt = progress::cancel_on_ctrl_c(control.cancel.clone());

    let result = compose::generate(
        &request,
        &groups,
        &mut selector,
        Arc::new(ProcessExecutor),
        &control,
    )
    .await;
    drop(control);
    let _ = printer.await;
    interrupt.abort();

    // Picks already counted even if some merges failed.
    if let Err(e) = selector.save_to_path(&usage_path) {
        tracing::warn!("could not save usage state to {}: {:#}", usage_path.display(), e);
    }

    let summary = result?;
    if summary.empty_rounds > 0 {
        println!("{} round(s) skipped: no clips to choose from.", summary.empty_rounds);
    }
    finish("generate", &summary.run, &output)
}
