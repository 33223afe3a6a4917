//! Typed events the engine emits while a batch runs.
//!
//! The worker is the only producer. Events go onto an unbounded channel so
//! the worker never blocks on a slow consumer, and a consumer that went away
//! entirely is tolerated: sends are fire-and-forget.

use crossbeam_channel::Sender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchEvent {
    /// Human-readable log line.
    Log(String),
    /// Emitted once per attempted volume, after all of that volume's log
    /// lines; `completed` grows monotonically regardless of outcome.
    Progress { completed: usize, total: usize },
    /// The batch is over; nothing further will be sent.
    Finished,
}

#[derive(Clone)]
pub struct EventSink {
    tx: Sender<BatchEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<BatchEvent>) -> Self {
        Self { tx }
    }

    pub fn log(&self, line: impl Into<String>) {
        let _ = self.tx.send(BatchEvent::Log(line.into()));
    }

    pub fn progress(&self, completed: usize, total: usize) {
        let _ = self.tx.send(BatchEvent::Progress { completed, total });
    }

    pub fn finished(&self) {
        let _ = self.tx.send(BatchEvent::Finished);
    }
}
