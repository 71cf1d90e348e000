//! `vbatch probe` – report what the host can encode with.

use anyhow::Result;
use std::ffi::OsStr;
use vbatch_core::config::VbatchConfig;
use vbatch_core::probe;
use vbatch_core::runner::ProcessExecutor;

use super::encode::yes_no;

pub fn run_probe(cfg: &VbatchConfig) -> Result<()> {
    let support = probe::detect(&ProcessExecutor, OsStr::new(&cfg.ffmpeg_path));
    println!("{:<14} {}", "ffmpeg", yes_no(support.ffmpeg));
    println!("{:<14} {}", "nvidia driver", yes_no(support.nvidia_gpu));
    println!("{:<14} {}", "h264_nvenc", yes_no(support.nvenc));
    println!(
        "{:<14} {}",
        "gpu encoding",
        if support.gpu_encoding() {
            "available (--gpu)"
        } else {
            "unavailable"
        }
    );
    if !support.ffmpeg {
        println!("ffmpeg could not be started: check ffmpeg_path in config.");
    }
    Ok(())
}
