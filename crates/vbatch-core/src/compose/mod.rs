//! Batch composer: N rounds of one-pick-per-group selection, each merged into one output.
//!
//! Selection runs synchronously before any job starts, so the selector is never
//! touched from worker threads. The resulting merge jobs then go through the
//! same bounded runner as single-file transcodes.

mod merge;

use rand::Rng;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::control::RunControl;
use crate::runner::{run_batch, BatchError, Job, JobExecutor, RunEvent, RunOutcome, RunSummary};
use crate::selector::{CandidateGroup, FairSelector};

pub use merge::{concat_list, merge_job, OutputNaming};

/// Inputs of one `generate` invocation.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Number of rounds; 0 yields an empty, completed run.
    pub rounds: usize,
    pub parallelism: usize,
    pub naming: OutputNaming,
    /// ffmpeg executable.
    pub ffmpeg: OsString,
}

impl ComposeRequest {
    /// Reject the request before any selection happens (and before usage counts move).
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.parallelism == 0 {
            return Err(BatchError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.naming.prefix.trim().is_empty() {
            return Err(BatchError::InvalidConfig(
                "output prefix must not be empty".to_string(),
            ));
        }
        if self.naming.output_dir.as_os_str().is_empty() {
            return Err(BatchError::InvalidConfig(
                "output directory must be set".to_string(),
            ));
        }
        if self.ffmpeg.is_empty() {
            return Err(BatchError::InvalidConfig(
                "ffmpeg program must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Jobs produced by the selection phase.
#[derive(Debug, Clone, Default)]
pub struct RoundPlan {
    pub jobs: Vec<Job>,
    /// Rounds that ran selection (fewer than requested if cancelled).
    pub rounds_planned: usize,
    /// Rounds where every group was empty, so no job was made.
    pub empty_rounds: usize,
    /// Cancellation was seen before all rounds were planned.
    pub cancelled: bool,
}

/// Result of a compose run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeSummary {
    pub run: RunSummary,
    pub rounds_planned: usize,
    pub empty_rounds: usize,
}

/// Selection phase: one pick per group per round, groups visited in order.
///
/// Empty groups contribute nothing; a round with no picks at all produces no
/// job and a `RoundSkipped` event.
pub fn plan_rounds<R: Rng>(
    request: &ComposeRequest,
    groups: &[CandidateGroup<PathBuf>],
    selector: &mut FairSelector<PathBuf, R>,
    control: &RunControl,
) -> RoundPlan {
    let mut plan = RoundPlan::default();
    for round in 1..=request.rounds {
        if control.cancel.is_cancelled() {
            tracing::info!(round, "cancel requested; no further rounds");
            plan.cancelled = true;
            break;
        }
        plan.rounds_planned += 1;

        let picks: Vec<PathBuf> = groups.iter().filter_map(|g| selector.select(g)).collect();
        if picks.is_empty() {
            tracing::debug!(round, "every group empty; round skipped");
            plan.empty_rounds += 1;
            control.emit(RunEvent::RoundSkipped { round });
            continue;
        }
        tracing::debug!(round, picks = picks.len(), "round selected");
        plan.jobs
            .push(merge_job(&request.ffmpeg, &picks, &request.naming, round));
    }
    plan
}

/// Plans every round, then runs the merge jobs with the request's parallelism.
pub async fn generate<R: Rng>(
    request: &ComposeRequest,
    groups: &[CandidateGroup<PathBuf>],
    selector: &mut FairSelector<PathBuf, R>,
    executor: Arc<dyn JobExecutor>,
    control: &RunControl,
) -> Result<ComposeSummary, BatchError> {
    request.validate()?;
    let plan = plan_rounds(request, groups, selector, control);
    tracing::info!(
        rounds = request.rounds,
        planned = plan.rounds_planned,
        jobs = plan.jobs.len(),
        empty = plan.empty_rounds,
        "compose plan ready"
    );

    let mut run = run_batch(plan.jobs, request.parallelism, executor, control).await?;
    if plan.cancelled {
        run.outcome = RunOutcome::Cancelled;
    }
    Ok(ComposeSummary {
        run,
        rounds_planned: plan.rounds_planned,
        empty_rounds: plan.empty_rounds,
    })
}
