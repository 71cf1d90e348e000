//! Single-file transcode batches: one ffmpeg job per source file.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EncodeConfig;
use crate::control::RunControl;
use crate::runner::{run_batch, BatchError, Job, JobExecutor, PostAction, RunSummary};

/// Inputs of one `encode` invocation. `files` are already filtered by extension.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    /// Root the files were found under; their relative layout is mirrored in `output_dir`.
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub parallelism: usize,
    pub ffmpeg: OsString,
    pub encode: EncodeConfig,
}

impl TranscodeRequest {
    /// Presence checks only; value formats are the caller's concern.
    pub fn validate(&self) -> Result<(), BatchError> {
        let invalid = |msg: &str| Err(BatchError::InvalidConfig(msg.to_string()));
        if self.parallelism == 0 {
            return invalid("parallelism must be at least 1");
        }
        if self.output_dir.as_os_str().is_empty() {
            return invalid("output directory must be set");
        }
        if self.ffmpeg.is_empty() {
            return invalid("ffmpeg program must be set");
        }
        let e = &self.encode;
        if [
            &e.video_bitrate,
            &e.max_rate,
            &e.buffer_size,
            &e.audio_bitrate,
            &e.scale,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
        {
            return invalid("encode bitrates and scale must be set");
        }
        Ok(())
    }
}

/// `<output_dir>/<path relative to source_root>` with a `.mp4` extension.
/// Files outside `source_root` keep only their file name.
pub fn output_path_for(source_root: &Path, input: &Path, output_dir: &Path) -> PathBuf {
    let relative = match input.strip_prefix(source_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => input
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output")),
    };
    output_dir.join(relative).with_extension("mp4")
}

/// `<stem>.part.mp4` next to the final output.
pub fn staging_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{}.part.mp4", stem))
}

/// ffmpeg arguments for one transcode; bitrate values are passed through verbatim.
pub fn transcode_args(input: &Path, output: &Path, encode: &EncodeConfig) -> Vec<OsString> {
    let scale = format!("scale={}", encode.scale);
    let frame_rate = encode.frame_rate.to_string();
    let options: [&str; 22] = [
        "-vf",
        &scale,
        "-r",
        &frame_rate,
        "-c:v",
        encode.render.encoder(),
        "-preset",
        encode.render.preset(),
        "-b:v",
        &encode.video_bitrate,
        "-maxrate",
        &encode.max_rate,
        "-bufsize",
        &encode.buffer_size,
        "-c:a",
        "aac",
        "-b:a",
        &encode.audio_bitrate,
        "-movflags",
        "faststart",
        "-loglevel",
        "error",
    ];
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.as_os_str().to_owned()];
    args.extend(options.iter().map(OsString::from));
    args.push(output.as_os_str().to_owned());
    args
}

/// Reserve a target and its staging file. `preferred` wins if neither path was
/// claimed yet; otherwise `<file name>.mp4` (keeping the source extension),
/// then `<file name>_<n>.mp4`.
fn claim_target(preferred: PathBuf, input: &Path, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let free = |p: &Path, taken: &HashSet<PathBuf>| {
        !taken.contains(p) && !taken.contains(&staging_path_for(p))
    };
    let mut candidate = preferred.clone();
    if !free(candidate.as_path(), &*taken) {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        candidate = preferred.with_file_name(format!("{}.mp4", name));
        let mut n = 2;
        while !free(candidate.as_path(), &*taken) {
            candidate = preferred.with_file_name(format!("{}_{}.mp4", name, n));
            n += 1;
        }
        tracing::warn!(
            input = %input.display(),
            taken = %preferred.display(),
            output = %candidate.display(),
            "output name already used by another source; renamed"
        );
    }
    taken.insert(staging_path_for(&candidate));
    taken.insert(candidate.clone());
    candidate
}

/// Build the job list for a request, in input order.
///
/// Every job gets its own target and staging file: sources that would map to
/// the same output (`a.mkv` and `a.mp4`) are renamed, first one wins.
pub fn plan_transcodes(request: &TranscodeRequest) -> Vec<Job> {
    let mut taken = HashSet::new();
    request
        .files
        .iter()
        .map(|input| {
            let target = claim_target(
                output_path_for(&request.source_root, input, &request.output_dir),
                input,
                &mut taken,
            );
            let staging = staging_path_for(&target);
            let label = input
                .strip_prefix(&request.source_root)
                .unwrap_or(input)
                .display()
                .to_string();
            Job::new(
                label,
                request.ffmpeg.clone(),
                transcode_args(input, &staging, &request.encode),
            )
            .with_post_action(PostAction::Promote { staging, target })
        })
        .collect()
}

/// Transcode every file in the request through the bounded runner.
pub async fn encode_all(
    request: &TranscodeRequest,
    executor: Arc<dyn JobExecutor>,
    control: &RunControl,
) -> Result<RunSummary, BatchError> {
    request.validate()?;
    let jobs = plan_transcodes(request);
    tracing::info!(
        files = jobs.len(),
        output = %request.output_dir.display(),
        encoder = request.encode.render.encoder(),
        "transcode plan ready"
    );
    run_batch(jobs, request.parallelism, executor, control).await
}
