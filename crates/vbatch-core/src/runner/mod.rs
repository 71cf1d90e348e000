//! Bounded-parallel runner for external process jobs.
//!
//! Keeps up to `parallelism` jobs running at once; when one finishes, the
//! next queued job is started until the queue is empty or cancellation is
//! observed. Failed jobs are counted and logged, never retried, and never
//! stop their siblings.

mod error;
mod executor;
mod job;
mod progress;
mod run;

pub use error::BatchError;
pub use executor::{JobExecutor, ProcessExecutor, ProcessOutput};
pub use job::{Job, JobStatus, PostAction, ScratchFile};
pub use progress::{ProgressCounter, RunEvent, RunOutcome, RunSummary};
pub use run::run_batch;
