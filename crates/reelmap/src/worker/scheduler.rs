use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, error, info};

use crate::error::WorkerError;

use super::batch::BatchWorker;

/// Wakes the scheduler for an immediate batch.
///
/// Triggers coalesce: while one is pending, further triggers are no-ops.
#[derive(Clone)]
pub struct WorkerTrigger {
    sender: Sender<()>,
}

impl WorkerTrigger {
    #[cfg(test)]
    pub(crate) fn from_sender(sender: Sender<()>) -> Self {
        Self { sender }
    }

    /// Returns false only when the scheduler is gone.
    pub fn trigger(&self) -> bool {
        match self.sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }
}

/// Runs batches on a dedicated thread: one batch, then wait for the idle
/// delay or a trigger, then the next.
pub struct WorkerScheduler {
    trigger: WorkerTrigger,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerScheduler {
    /// Starts the loop with a caller-owned shutdown flag, e.g. one a
    /// Ctrl-C handler sets. The same flag should be given to `worker`.
    pub fn start_with_shutdown(
        worker: BatchWorker,
        idle_delay: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        let (sender, receiver) = bounded::<()>(1);
        let shutdown_flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("reelmap-worker".into())
            .spawn(move || run_loop(worker, receiver, idle_delay, shutdown_flag))
            .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

        info!("Worker started (idle delay {}s)", idle_delay.as_secs());

        Ok(Self {
            trigger: WorkerTrigger { sender },
            shutdown,
            handle: Some(handle),
        })
    }

    pub fn trigger(&self) -> WorkerTrigger {
        self.trigger.clone()
    }

    /// Asks the loop to stop after the current item.
    pub fn shutdown(&self) {
        info!("Shutting down worker...");
        self.shutdown.store(true, Ordering::Relaxed);
        self.trigger.trigger();
    }

    /// Waits for the loop thread to exit.
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                error!("Worker thread panicked: {:?}", e);
            }
        }
        info!("Worker has stopped");
    }
}

fn run_loop(
    worker: BatchWorker,
    wake: Receiver<()>,
    idle_delay: Duration,
    shutdown: Arc<AtomicBool>,
) {
    debug!("Worker loop started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        if let Err(e) = worker.run_once() {
            error!("Batch failed: {}", e);
        }

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match wake.recv_timeout(idle_delay) {
            Ok(()) => debug!("Worker triggered"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Trigger channel disconnected");
                break;
            }
        }
    }

    debug!("Worker loop stopped");
}
