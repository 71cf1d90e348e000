//! Output naming and the concat-merge job for one round.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::runner::{Job, PostAction, ScratchFile};

/// Container extension of composed outputs.
const OUTPUT_EXTENSION: &str = "mp4";

/// Where round N writes: `<output_dir>/<prefix>_<N>.mp4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    pub output_dir: PathBuf,
    pub prefix: String,
}

impl OutputNaming {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    fn stem(&self, round: usize) -> String {
        format!("{}_{}", self.prefix, round)
    }

    pub fn output_path(&self, round: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.stem(round), OUTPUT_EXTENSION))
    }

    /// Written by ffmpeg and renamed to `output_path` once it exits cleanly.
    pub fn staging_path(&self, round: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}.part.{}", self.stem(round), OUTPUT_EXTENSION))
    }

    /// Concat list for the round; one per round so parallel merges never share it.
    pub fn list_path(&self, round: usize) -> PathBuf {
        self.output_dir
            .join(format!(".{}.concat.txt", self.stem(round)))
    }
}

/// Concat demuxer list: one `file '<path>'` line per item, single quotes escaped.
///
/// ffmpeg resolves relative entries against the list file's directory, so
/// items should be absolute.
pub fn concat_list(items: &[PathBuf]) -> String {
    items
        .iter()
        .map(|p| format!("file '{}'\n", quote_for_concat(p)))
        .collect()
}

fn quote_for_concat(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Stream-copy concat of `items` (in order) into round `round`'s output.
pub fn merge_job(ffmpeg: &OsStr, items: &[PathBuf], naming: &OutputNaming, round: usize) -> Job {
    let list = naming.list_path(round);
    let staging = naming.staging_path(round);
    let target = naming.output_path(round);
    let args: Vec<OsString> = vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list.clone().into_os_string(),
        "-c".into(),
        "copy".into(),
        "-loglevel".into(),
        "error".into(),
        staging.clone().into_os_string(),
    ];
    let label = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| naming.stem(round));
    Job::new(label, ffmpeg, args)
        .with_scratch(ScratchFile {
            path: list,
            contents: concat_list(items),
        })
        .with_post_action(PostAction::Promote { staging, target })
}
