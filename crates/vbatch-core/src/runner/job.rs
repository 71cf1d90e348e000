//! Job description and the per-job lifecycle run on a worker thread:
//! write scratch input, run the process, drop scratch, then promote or discard output.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::executor::{JobExecutor, ProcessOutput};

/// Lines of stderr kept in a failure diagnostic.
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// File written before the process starts and removed after it exits, whatever the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Side effect applied after the process exits successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    /// Rename the staging output to its final name. On failure the partial
    /// staging file is removed instead, so no half-written output remains.
    Promote { staging: PathBuf, target: PathBuf },
    /// Delete a file (e.g. an intermediate the process consumed).
    RemoveFile(PathBuf),
}

/// One unit of external work. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Human-readable identity used in logs and progress events.
    pub label: String,
    pub program: OsString,
    pub args: Vec<OsString>,
    pub scratch: Option<ScratchFile>,
    pub on_success: Option<PostAction>,
}

impl Job {
    pub fn new(label: impl Into<String>, program: impl Into<OsString>, args: Vec<OsString>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args,
            scratch: None,
            on_success: None,
        }
    }

    pub fn with_scratch(mut self, scratch: ScratchFile) -> Self {
        self.scratch = Some(scratch);
        self
    }

    pub fn with_post_action(mut self, action: PostAction) -> Self {
        self.on_success = Some(action);
        self
    }

    /// Create output directories and write the scratch file.
    fn prepare(&self) -> io::Result<()> {
        if let Some(PostAction::Promote { staging, .. }) = &self.on_success {
            create_parent(staging)?;
        }
        if let Some(scratch) = &self.scratch {
            create_parent(&scratch.path)?;
            fs::write(&scratch.path, &scratch.contents)?;
        }
        Ok(())
    }

    fn remove_scratch(&self) {
        if let Some(scratch) = &self.scratch {
            remove_if_exists(&scratch.path, "scratch file");
        }
    }

    fn apply_post_action(&self) -> io::Result<()> {
        match &self.on_success {
            Some(PostAction::Promote { staging, target }) => fs::rename(staging, target),
            Some(PostAction::RemoveFile(path)) => match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn discard_output(&self) {
        if let Some(PostAction::Promote { staging, .. }) = &self.on_success {
            remove_if_exists(staging, "partial output");
        }
    }
}

/// Result of one job as seen by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    Failed { diagnostic: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }
}

/// Runs one job to completion on the calling (blocking) thread.
///
/// Returns `Err` only when the executor could not start the process.
pub(super) fn execute_job(job: &Job, executor: &dyn JobExecutor) -> io::Result<JobStatus> {
    if let Err(e) = job.prepare() {
        job.remove_scratch();
        return Ok(JobStatus::Failed {
            diagnostic: format!("prepare: {}", e),
        });
    }

    let output = executor.execute(&job.program, &job.args);
    job.remove_scratch();
    let output = output?;

    if !output.success {
        job.discard_output();
        return Ok(JobStatus::Failed {
            diagnostic: failure_diagnostic(&output),
        });
    }
    match job.apply_post_action() {
        Ok(()) => Ok(JobStatus::Succeeded),
        Err(e) => {
            job.discard_output();
            Ok(JobStatus::Failed {
                diagnostic: format!("finalize output: {}", e),
            })
        }
    }
}

fn failure_diagnostic(output: &ProcessOutput) -> String {
    let stderr = output.stderr.trim();
    let code = output
        .code
        .map(|c| format!("exit code {}", c))
        .unwrap_or_else(|| "terminated by signal".to_string());
    if stderr.is_empty() {
        return code;
    }
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = &lines[lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES)..];
    format!("{}: {}", code, tail.join("\n"))
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn remove_if_exists(path: &Path, what: &str) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "could not remove {}", what);
        }
    }
}
