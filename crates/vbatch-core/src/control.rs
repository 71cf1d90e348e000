//! Cooperative cancellation shared between the caller and a batch run.
//!
//! The runner polls the token before every job submission and after every
//! completion; the composer polls it before every round. Setting it never
//! interrupts a process that is already running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::runner::{ProgressCounter, RunEvent};

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Everything a batch shares with its caller: the cancel flag, the completed/total
/// counters, and an optional event channel.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub cancel: CancelToken,
    pub progress: Arc<ProgressCounter>,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send run events to `tx`. A closed receiver is ignored.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub(crate) fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn control_emits_to_channel_and_ignores_closed_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = RunControl::new().with_events(tx);
        control.emit(RunEvent::RoundSkipped { round: 2 });
        assert_eq!(rx.try_recv().unwrap(), RunEvent::RoundSkipped { round: 2 });
        drop(rx);
        control.emit(RunEvent::RoundSkipped { round: 3 });
    }
}
