//! The dispatch loop: fill the pool, wait for the next completion, repeat.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::control::RunControl;

use super::error::BatchError;
use super::executor::JobExecutor;
use super::job::{execute_job, Job, JobStatus};
use super::progress::{RunEvent, RunOutcome, RunSummary};

/// Runs `jobs` with at most `parallelism` in flight. Each job runs on a blocking
/// worker thread since it waits on an external process.
///
/// The cancel flag is checked before each submission and after each completion;
/// once it is seen no new job starts, but running jobs are left to finish.
/// A job that fails is counted and logged; the rest of the batch carries on.
/// If a process cannot be started at all, submission stops, in-flight jobs
/// drain, and `BatchError::Spawn` is returned.
pub async fn run_batch(
    jobs: Vec<Job>,
    parallelism: usize,
    executor: Arc<dyn JobExecutor>,
    control: &RunControl,
) -> Result<RunSummary, BatchError> {
    if parallelism == 0 {
        return Err(BatchError::InvalidConfig(
            "parallelism must be at least 1".to_string(),
        ));
    }

    let total = jobs.len();
    let mut queue = jobs.into_iter();
    let mut summary = RunSummary::new(total);
    let mut join_set: JoinSet<(String, std::io::Result<JobStatus>)> = JoinSet::new();
    let mut halted = false;
    let mut fatal: Option<BatchError> = None;
    control.progress.start(total);
    tracing::info!(total, parallelism, "batch started");

    loop {
        while !halted && join_set.len() < parallelism && queue.len() > 0 {
            if control.cancel.is_cancelled() {
                halted = true;
                summary.outcome = RunOutcome::Cancelled;
                tracing::info!(
                    submitted = summary.submitted,
                    remaining = queue.len(),
                    "cancel requested; no further jobs will start"
                );
                break;
            }
            let Some(job) = queue.next() else {
                break;
            };
            summary.submitted += 1;
            tracing::debug!(job = %job.label, "starting job");
            let executor = Arc::clone(&executor);
            join_set.spawn_blocking(move || {
                let status = execute_job(&job, executor.as_ref());
                (job.label, status)
            });
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let completed = control.progress.record_completion();
        summary.completed += 1;

        let (label, status) = match joined {
            Ok((label, Ok(status))) => (label, status),
            Ok((label, Err(e))) => {
                tracing::error!(job = %label, error = %e, "could not start process; stopping batch");
                let status = JobStatus::Failed {
                    diagnostic: format!("could not start process: {}", e),
                };
                halted = true;
                if fatal.is_none() {
                    fatal = Some(BatchError::Spawn {
                        label: label.clone(),
                        source: e,
                    });
                }
                (label, status)
            }
            Err(e) => {
                tracing::error!(error = %e, "job worker panicked; stopping batch");
                let status = JobStatus::Failed {
                    diagnostic: format!("worker panicked: {}", e),
                };
                halted = true;
                if fatal.is_none() {
                    fatal = Some(BatchError::Join(e));
                }
                ("<unknown>".to_string(), status)
            }
        };

        match &status {
            JobStatus::Succeeded => {
                tracing::info!(job = %label, completed, total, "job succeeded");
            }
            JobStatus::Failed { diagnostic } => {
                summary.failed += 1;
                tracing::warn!(job = %label, completed, total, %diagnostic, "job failed");
            }
        }
        control.emit(RunEvent::JobFinished {
            completed,
            total,
            label,
            status,
        });

        if !halted && queue.len() > 0 && control.cancel.is_cancelled() {
            halted = true;
            summary.outcome = RunOutcome::Cancelled;
            tracing::info!(
                submitted = summary.submitted,
                remaining = queue.len(),
                "cancel requested; waiting for running jobs"
            );
        }
    }

    if let Some(e) = fatal {
        return Err(e);
    }
    tracing::info!(
        submitted = summary.submitted,
        completed = summary.completed,
        failed = summary.failed,
        outcome = ?summary.outcome,
        "batch finished"
    );
    Ok(summary)
}
