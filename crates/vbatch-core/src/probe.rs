//! Hardware encoder detection, run before a GPU transcode is accepted.

use std::ffi::{OsStr, OsString};

use crate::runner::JobExecutor;

/// What the host can do for `RenderMode::Gpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HardwareSupport {
    /// ffmpeg starts at all.
    pub ffmpeg: bool,
    /// `nvidia-smi` exits successfully.
    pub nvidia_gpu: bool,
    /// `ffmpeg -encoders` lists `h264_nvenc`.
    pub nvenc: bool,
}

impl HardwareSupport {
    pub fn gpu_encoding(&self) -> bool {
        self.nvidia_gpu && self.nvenc
    }
}

/// Probe ffmpeg and the NVIDIA driver. A program that cannot be started counts as unsupported.
pub fn detect(executor: &dyn JobExecutor, ffmpeg: &OsStr) -> HardwareSupport {
    let nvidia_gpu = match executor.execute(OsStr::new("nvidia-smi"), &[]) {
        Ok(out) => out.success,
        Err(e) => {
            tracing::debug!(error = %e, "nvidia-smi not runnable");
            false
        }
    };
    let (ffmpeg_ok, nvenc) = match executor.execute(ffmpeg, &[OsString::from("-encoders")]) {
        Ok(out) => (true, out.success && out.stdout.contains("h264_nvenc")),
        Err(e) => {
            tracing::debug!(error = %e, "ffmpeg not runnable");
            (false, false)
        }
    };
    let support = HardwareSupport {
        ffmpeg: ffmpeg_ok,
        nvidia_gpu,
        nvenc,
    };
    tracing::debug!(?support, "hardware probe");
    support
}
