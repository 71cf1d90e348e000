//! Scriptable `JobExecutor` that never spawns a process.

#![allow(dead_code)]

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use vbatch_core::control::CancelToken;
use vbatch_core::runner::{Job, JobExecutor, ProcessOutput};

/// Job whose only argument names it, so the fake can tell jobs apart.
pub fn named_job(name: &str) -> Job {
    Job::new(name, "fake", vec![OsString::from(name)])
}

/// The fake identifies a job by the file name of its last argument
/// (the job name for `named_job`, the staging output for ffmpeg jobs).
fn job_name(args: &[OsString]) -> String {
    args.last()
        .and_then(|a| Path::new(a).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Default)]
pub struct FakeExecutor {
    /// Jobs (by name) that exit non-zero.
    pub fail: HashSet<String>,
    /// Jobs that cannot be started.
    pub unspawnable: HashSet<String>,
    /// Cancel this token while running the named job.
    pub cancel_during: Option<(String, CancelToken)>,
    pub delay: Duration,
    /// Write the last argument as an output file, like ffmpeg would.
    pub write_output: bool,
    pub ran: Mutex<Vec<String>>,
    /// Contents of the file after `-i`, read while the job runs.
    pub inputs: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<Vec<OsString>>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeExecutor {
    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn peak_parallelism(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl JobExecutor for FakeExecutor {
    fn execute(&self, _program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        let name = job_name(args);
        self.calls.lock().unwrap().push(args.to_vec());
        if self.unspawnable.contains(&name) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some((target, token)) = &self.cancel_during {
            if *target == name {
                token.cancel();
            }
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(pos) = args.iter().position(|a| a == "-i") {
            if let Some(input) = args.get(pos + 1) {
                if let Ok(text) = fs::read_to_string(input) {
                    self.inputs.lock().unwrap().push(text);
                }
            }
        }
        if self.write_output {
            if let Some(out) = args.last() {
                fs::write(out, b"merged")?;
            }
        }
        self.ran.lock().unwrap().push(name.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.contains(&name) {
            Ok(ProcessOutput::failed(1, format!("{name}: conversion failed")))
        } else {
            Ok(ProcessOutput::succeeded())
        }
    }
}
