//! CLI for vbatch.

mod commands;
mod progress;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use vbatch_core::config;

use commands::{
    run_completions, run_encode, run_generate, run_man, run_probe, run_usage, EncodeOverrides,
    GenerateOptions,
};

/// Top-level CLI for vbatch.
#[derive(Debug, Parser)]
#[command(name = "vbatch")]
#[command(about = "vbatch: batch video transcoding and fair random composition via ffmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Transcode every media file under a directory into a mirrored output tree.
    Encode {
        /// Directory scanned recursively (default: `source_dir` from config).
        source: Option<PathBuf>,
        /// Output directory (default: `output_dir` from config).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run up to N ffmpeg processes at once (default: `parallelism` from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Target video bitrate, e.g. 3M.
        #[arg(long, value_name = "RATE")]
        video_bitrate: Option<String>,
        /// Maximum video bitrate, e.g. 5M.
        #[arg(long, value_name = "RATE")]
        max_rate: Option<String>,
        /// Rate-control buffer size, e.g. 5M.
        #[arg(long, value_name = "RATE")]
        buffer_size: Option<String>,
        /// Audio bitrate, e.g. 128k.
        #[arg(long, value_name = "RATE")]
        audio_bitrate: Option<String>,
        /// Encode on an NVIDIA GPU (h264_nvenc). Checked before any file is queued.
        #[arg(long)]
        gpu: bool,
    },

    /// Build N outputs, each concatenating one fairly chosen clip per sub-directory.
    Generate {
        /// Parent directory; each immediate sub-directory is one candidate group
        /// (default: `source_dir` from config).
        source: Option<PathBuf>,
        /// Output directory (default: `output_dir` from config).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Number of outputs to build.
        #[arg(long, default_value = "1", value_name = "N")]
        rounds: usize,
        /// Output file prefix; outputs are named <PREFIX>_<N>.mp4.
        #[arg(long)]
        prefix: Option<String>,
        /// Run up to N merges at once (default: `parallelism` from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Ignore saved usage counts for this run (they are still saved afterwards).
        /// Rounds are all selected up front, so a cancelled run saves their picks too.
        #[arg(long)]
        fresh: bool,
    },

    /// Check ffmpeg and NVIDIA encoder availability.
    Probe,

    /// Show how often each clip has been picked by `generate`.
    ///
    /// Picks are counted when a round is planned, before its merge runs, so
    /// rounds left unstarted by Ctrl-C still count.
    Usage {
        /// Forget all saved usage counts and recent picks.
        #[arg(long)]
        reset: bool,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // These two only render the command tree; no config needed.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Encode {
                source,
                output,
                jobs,
                video_bitrate,
                max_rate,
                buffer_size,
                audio_bitrate,
                gpu,
            } => {
                let overrides = EncodeOverrides {
                    video_bitrate,
                    max_rate,
                    buffer_size,
                    audio_bitrate,
                    gpu,
                };
                run_encode(&cfg, source, output, jobs, overrides).await?;
            }
            CliCommand::Generate {
                source,
                output,
                rounds,
                prefix,
                jobs,
                fresh,
            } => {
                let options = GenerateOptions {
                    rounds,
                    prefix,
                    jobs,
                    fresh,
                };
                run_generate(&cfg, source, output, options).await?;
            }
            CliCommand::Probe => run_probe(&cfg)?,
            CliCommand::Usage { reset } => run_usage(&cfg, reset)?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
