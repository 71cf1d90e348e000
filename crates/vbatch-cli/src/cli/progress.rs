//! Console side of a batch run: one line per finished job, and Ctrl-C wired to the cancel token.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use vbatch_core::control::CancelToken;
use vbatch_core::runner::{JobStatus, RunEvent, RunOutcome, RunSummary};

/// Lines of a failure diagnostic echoed to the console; the full text is in the log.
const DIAGNOSTIC_LINES: usize = 3;

pub fn render_event(event: &RunEvent) -> String {
    match event {
        RunEvent::JobFinished {
            completed,
            total,
            label,
            status: JobStatus::Succeeded,
        } => format!("[{}/{}] done    {}", completed, total, label),
        RunEvent::JobFinished {
            completed,
            total,
            label,
            status: JobStatus::Failed { diagnostic },
        } => {
            let mut line = format!("[{}/{}] FAILED  {}", completed, total, label);
            let tail: Vec<&str> = diagnostic.lines().collect();
            for l in &tail[tail.len().saturating_sub(DIAGNOSTIC_LINES)..] {
                line.push_str("\n        ");
                line.push_str(l);
            }
            line
        }
        RunEvent::RoundSkipped { round } => {
            format!("round {}: every group is empty, nothing to merge", round)
        }
    }
}

/// Prints events until every sender is dropped.
pub fn spawn_printer(mut rx: UnboundedReceiver<RunEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", render_event(&event));
        }
    })
}

/// First Ctrl-C requests cancellation; running ffmpeg processes are left to finish.
pub fn cancel_on_ctrl_c(token: CancelToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("Cancelling: no new jobs will start; waiting for running ones.");
                tracing::info!("ctrl-c received; cancelling batch");
                token.cancel();
            }
            Err(e) => tracing::warn!("could not listen for ctrl-c: {}", e),
        }
    })
}

pub fn summary_line(kind: &str, summary: &RunSummary) -> String {
    let state = match summary.outcome {
        RunOutcome::Completed => "finished",
        RunOutcome::Cancelled => "cancelled",
    };
    let mut line = format!(
        "{} {}: {} succeeded, {} failed",
        kind,
        state,
        summary.succeeded(),
        summary.failed
    );
    if summary.submitted < summary.total {
        line.push_str(&format!(", {} not started", summary.total - summary.submitted));
    }
    line
}
