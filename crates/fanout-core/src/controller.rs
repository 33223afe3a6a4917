//! Single-live-batch ownership.
//!
//! The controller owns at most one worker thread at a time; asking for a
//! second batch while one is running is answered with a typed error instead
//! of queueing or interleaving.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering::Relaxed};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::batch::{run_batch, BatchReport, BatchRequest};
use crate::errors::SourceUnreadable;
use crate::events::EventSink;
use crate::volumes::FreeSpaceProbe;

/// A batch was requested while another is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyError;

impl fmt::Display for BusyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a batch is already running")
    }
}

impl std::error::Error for BusyError {}

struct ActiveBatch {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<Result<BatchReport, SourceUnreadable>>,
}

#[derive(Default)]
pub struct BatchController {
    active: Mutex<Option<ActiveBatch>>,
}

impl BatchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the batch worker thread. All blocking filesystem work happens
    /// there; the caller keeps draining the event channel.
    pub fn start(
        &self,
        request: BatchRequest,
        probe: Arc<dyn FreeSpaceProbe>,
        events: EventSink,
    ) -> Result<(), BusyError> {
        let mut active = self.active.lock();
        if let Some(batch) = active.as_ref() {
            if !batch.worker.is_finished() {
                return Err(BusyError);
            }
        }
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker =
            std::thread::spawn(move || run_batch(&request, probe.as_ref(), &events, &worker_stop));
        *active = Some(ActiveBatch { stop, worker });
        Ok(())
    }

    /// Ask the running batch to stop at the next volume boundary. A volume
    /// already being written is finished first.
    pub fn cancel(&self) {
        if let Some(batch) = self.active.lock().as_ref() {
            batch.stop.store(true, Relaxed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|batch| !batch.worker.is_finished())
    }

    /// Wait for the current batch and take its result. `None` when no batch
    /// was started since the last join.
    pub fn join(&self) -> Option<Result<BatchReport, SourceUnreadable>> {
        let batch = self.active.lock().take()?;
        match batch.worker.join() {
            Ok(result) => Some(result),
            Err(_) => {
                log::error!("batch worker panicked");
                None
            }
        }
    }
}
