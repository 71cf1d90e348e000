//! `vbatch encode` – transcode every media file under a directory.

use anyhow::{bail, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use vbatch_core::config::{EncodeConfig, RenderMode, VbatchConfig};
use vbatch_core::control::RunControl;
use vbatch_core::probe;
use vbatch_core::runner::ProcessExecutor;
use vbatch_core::transcode::{encode_all, TranscodeRequest};

use super::{finish, resolve_output, resolve_source};
use crate::cli::{progress, scan};

/// Per-run encode settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct EncodeOverrides {
    pub video_bitrate: Option<String>,
    pub max_rate: Option<String>,
    pub buffer_size: Option<String>,
    pub audio_bitrate: Option<String>,
    pub gpu: bool,
}

impl EncodeOverrides {
    pub fn apply(&self, encode: &mut EncodeConfig) {
        let pairs = [
            (&self.video_bitrate, &mut encode.video_bitrate),
            (&self.max_rate, &mut encode.max_rate),
            (&self.buffer_size, &mut encode.buffer_size),
            (&self.audio_bitrate, &mut encode.audio_bitrate),
        ];
        for (value, slot) in pairs {
            if let Some(v) = value {
                *slot = v.trim().to_string();
            }
        }
        if self.gpu {
            encode.render = RenderMode::Gpu;
        }
    }
}

/// `--jobs 0` has always meant "one at a time"; keep that rather than fail.
pub(crate) fn effective_jobs(requested: Option<usize>, configured: usize) -> usize {
    match requested.unwrap_or(configured) {
        0 => {
            tracing::warn!("parallelism 0 requested; running one job at a time");
            1
        }
        n => n,
    }
}

pub async fn run_encode(
    cfg: &VbatchConfig,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    jobs: Option<usize>,
    overrides: EncodeOverrides,
) -> Result<()> {
    let mut effective = cfg.clone();
    overrides.apply(&mut effective.encode);
    effective.validate()?;

    let source = resolve_source(source, cfg.source_dir.as_ref())?;
    let output = resolve_output(output, cfg.output_dir.as_ref())?;
    let ffmpeg = OsString::from(&cfg.ffmpeg_path);

    if effective.encode.render == RenderMode::Gpu {
        let support = probe::detect(&ProcessExecutor, &ffmpeg);
        if !support.gpu_encoding() {
            bail!("GPU encoding requested but not available (nvidia driver: {}, h264_nvenc: {}); run without --gpu",
                yes_no(support.nvidia_gpu), yes_no(support.nvenc));
        }
    }

    let files = scan::media_files(&source, cfg, Some(&output))?;
    if files.is_empty() {
        println!("No media files found under {}.", source.display());
        return Ok(());
    }
    let parallelism = effective_jobs(jobs, cfg.parallelism);
    println!(
        "Encoding {} file(s) with {} ({} at a time)...",
        files.len(),
        effective.encode.render.encoder(),
        parallelism
    );

    let request = TranscodeRequest {
        source_root: source,
        output_dir: output.clone(),
        files,
        parallelism,
        ffmpeg,
        encode: effective.encode,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let control = RunControl::new().with_events(tx);
    let printer = progress::spawn_printer(rx);
    let interrupt = progress::cancel_on_ctrl_c(control.cancel.clone());

    let result = encode_all(&request, Arc::new(ProcessExecutor), &control).await;
    drop(control);
    let _ = printer.await;
    interrupt.abort();

    finish("encode", &result?, &output)
}

pub(crate) fn yes_no(v: bool) -> &'static str {
    if v {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let mut encode = EncodeConfig::default();
        let overrides = EncodeOverrides {
            video_bitrate: Some(" 4M ".to_string()),
            audio_bitrate: Some("192k".to_string()),
            ..EncodeOverrides::default()
        };
        overrides.apply(&mut encode);
        assert_eq!(encode.video_bitrate, "4M");
        assert_eq!(encode.audio_bitrate, "192k");
        assert_eq!(encode.max_rate, EncodeConfig::default().max_rate);
        assert_eq!(encode.render, RenderMode::Cpu);
    }

    #[test]
    fn gpu_flag_switches_render_mode() {
        let mut encode = EncodeConfig::default();
        EncodeOverrides {
            gpu: true,
            ..EncodeOverrides::default()
        }
        .apply(&mut encode);
        assert_eq!(encode.render, RenderMode::Gpu);
    }

    #[test]
    fn zero_jobs_means_one() {
        assert_eq!(effective_jobs(Some(0), 4), 1);
        assert_eq!(effective_jobs(None, 3), 3);
        assert_eq!(effective_jobs(Some(6), 1), 6);
    }
}
