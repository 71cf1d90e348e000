//! Process execution seam. The runner only ever talks to `JobExecutor`, so tests
//! can substitute a fake that never spawns anything.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, Stdio};

/// Exit signal and captured output of one process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs one argument list to completion. Called from blocking worker threads.
///
/// `Err` means the process could not be started at all and aborts the batch;
/// a process that starts and exits non-zero is reported through `ProcessOutput`.
pub trait JobExecutor: Send + Sync {
    fn execute(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Spawns real processes with stdin closed and stdout/stderr captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl JobExecutor for ProcessExecutor {
    fn execute(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        let output = cmd.output()?;
        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> io::Result<ProcessOutput> {
        ProcessExecutor.execute(
            OsStr::new("sh"),
            &[OsString::from("-c"), OsString::from(script)],
        )
    }

    #[test]
    fn captures_success_and_stdout() {
        let out = sh("echo hello").unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn captures_failure_code_and_stderr() {
        let out = sh("echo broken >&2; exit 3").unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stderr.trim(), "broken");
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let err = ProcessExecutor
            .execute(OsStr::new("vbatch-definitely-not-a-program"), &[])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
