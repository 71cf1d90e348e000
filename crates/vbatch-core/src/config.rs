use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Video encoder family used for single-file transcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Software x264.
    #[default]
    Cpu,
    /// NVENC on an NVIDIA GPU.
    Gpu,
}

impl RenderMode {
    /// ffmpeg video encoder name.
    pub fn encoder(self) -> &'static str {
        match self {
            RenderMode::Cpu => "libx264",
            RenderMode::Gpu => "h264_nvenc",
        }
    }

    /// ffmpeg preset matching the encoder.
    pub fn preset(self) -> &'static str {
        match self {
            RenderMode::Cpu => "medium",
            RenderMode::Gpu => "p5",
        }
    }
}

/// Transcode parameters (`[encode]` section). Passed through verbatim into ffmpeg arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Target video bitrate (`-b:v`), e.g. "3M".
    pub video_bitrate: String,
    /// Peak video bitrate (`-maxrate`).
    pub max_rate: String,
    /// Rate control buffer (`-bufsize`).
    pub buffer_size: String,
    /// AAC audio bitrate (`-b:a`).
    pub audio_bitrate: String,
    /// Scale filter argument, "W:H".
    pub scale: String,
    /// Output frame rate.
    pub frame_rate: u32,
    pub render: RenderMode,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_bitrate: "3M".to_string(),
            max_rate: "5M".to_string(),
            buffer_size: "5M".to_string(),
            audio_bitrate: "128k".to_string(),
            scale: "1080:1920".to_string(),
            frame_rate: 25,
            render: RenderMode::Cpu,
        }
    }
}

/// Fair composer parameters (`[compose]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Times an item may be picked before it becomes ineligible (until its group resets).
    pub usage_cap: u32,
    /// Number of most recent picks excluded when alternatives exist.
    pub recency_window: usize,
    /// Output file name prefix; round N writes `<prefix>_<N>.mp4`.
    pub output_prefix: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            usage_cap: 3,
            recency_window: 10,
            output_prefix: "output".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/vbatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VbatchConfig {
    /// Number of ffmpeg processes run at once.
    pub parallelism: usize,
    /// ffmpeg executable (name on PATH or absolute path).
    pub ffmpeg_path: String,
    /// Recognized media extensions, without the dot. Matched case-insensitively.
    pub extensions: Vec<String>,
    /// Default source directory when none is given on the command line.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    /// Default output directory when none is given on the command line.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub encode: EncodeConfig,
    #[serde(default)]
    pub compose: ComposeConfig,
}

impl Default for VbatchConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
            ffmpeg_path: "ffmpeg".to_string(),
            extensions: ["mp4", "avi", "mkv", "mov", "webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source_dir: None,
            output_dir: None,
            encode: EncodeConfig::default(),
            compose: ComposeConfig::default(),
        }
    }
}

impl VbatchConfig {
    /// Reject values that would make every run fail or behave surprisingly.
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.trim().is_empty() {
            bail!("ffmpeg_path must not be empty");
        }
        for (name, value) in [
            ("encode.video_bitrate", &self.encode.video_bitrate),
            ("encode.max_rate", &self.encode.max_rate),
            ("encode.buffer_size", &self.encode.buffer_size),
            ("encode.audio_bitrate", &self.encode.audio_bitrate),
        ] {
            if !is_valid_bitrate(value) {
                bail!("{} {:?} is not a bitrate (expected e.g. 3M or 128k)", name, value);
            }
        }
        if self.encode.frame_rate == 0 {
            bail!("encode.frame_rate must be at least 1");
        }
        if self.compose.usage_cap == 0 {
            bail!("compose.usage_cap must be at least 1");
        }
        if self.compose.output_prefix.trim().is_empty() {
            bail!("compose.output_prefix must not be empty");
        }
        Ok(())
    }

    /// True if `ext` (without the dot) is one of the recognized media extensions.
    pub fn is_media_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}

/// Bitrate shape accepted by ffmpeg rate options: digits, optional fraction, optional k/M/G suffix.
pub fn is_valid_bitrate(value: &str) -> bool {
    let digits = value
        .strip_suffix(|c: char| matches!(c, 'k' | 'K' | 'm' | 'M' | 'g' | 'G'))
        .unwrap_or(value);
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && frac.map_or(true, all_digits)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vbatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VbatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VbatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VbatchConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
