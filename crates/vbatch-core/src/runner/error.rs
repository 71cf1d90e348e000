//! Run-level errors. Individual job failures are not errors; see `JobStatus`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    /// Rejected before any job was submitted.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The external program could not be started at all; no further jobs are submitted.
    #[error("could not start process for job {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
    /// A worker panicked while running a job.
    #[error("job worker: {0}")]
    Join(#[from] tokio::task::JoinError),
}
