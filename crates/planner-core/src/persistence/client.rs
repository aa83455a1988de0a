//! Background persistence client.
//!
//! Requests are queued to a worker thread which performs the blocking
//! service calls. Outcomes come back over a channel and must be polled via
//! [`PersistenceClient::poll_events`], so the event loop never waits on the
//! network.
//!
//! Dropping the client cancels requests that have not started and detaches
//! the worker; [`PersistenceClient::shutdown`] drains the queue instead.

use super::{ServiceError, ServiceResult, ShapeRecord, ShapeService};
use crate::shapes::ShapeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A request for the shape service.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    FetchAll,
    Create(ShapeRecord),
    Delete(ShapeId),
}

impl PersistRequest {
    fn describe(&self) -> String {
        match self {
            PersistRequest::FetchAll => "fetch".to_string(),
            PersistRequest::Create(record) => format!("create {}", record.kind),
            PersistRequest::Delete(id) => format!("delete {}", id),
        }
    }
}

/// Outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Fetched(Vec<ShapeRecord>),
    Created(ShapeRecord),
    Deleted,
    Failed(ServiceError),
}

/// A completed request, tagged with the sequence number it was submitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistEvent {
    pub seq: u64,
    pub outcome: PersistOutcome,
}

enum WorkerCommand {
    Run { seq: u64, request: PersistRequest },
    Shutdown,
}

/// Fire-and-forget client running service calls on a worker thread.
pub struct PersistenceClient {
    cmd_tx: Option<Sender<WorkerCommand>>,
    /// Set on drop; the worker skips whatever is still queued.
    cancelled: Arc<AtomicBool>,
    event_rx: Receiver<PersistEvent>,
    thread: Option<JoinHandle<()>>,
}

impl PersistenceClient {
    /// Start the worker thread for the given service.
    pub fn spawn(service: Arc<dyn ShapeService>) -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (event_tx, event_rx) = channel::<PersistEvent>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = cancelled.clone();

        let handle = thread::spawn(move || {
            log::debug!("Persistence worker started");
            while let Ok(command) = cmd_rx.recv() {
                let (seq, request) = match command {
                    WorkerCommand::Run { seq, request } => (seq, request),
                    WorkerCommand::Shutdown => break,
                };
                if worker_cancelled.load(Ordering::SeqCst) {
                    log::debug!("Dropping request #{} ({})", seq, request.describe());
                    break;
                }
                let outcome = execute(service.as_ref(), &request);
                if let PersistOutcome::Failed(ref e) = outcome {
                    log::error!("Request #{} ({}) failed: {}", seq, request.describe(), e);
                } else {
                    log::debug!("Request #{} ({}) done", seq, request.describe());
                }
                if event_tx.send(PersistEvent { seq, outcome }).is_err() {
                    break;
                }
            }
            log::debug!("Persistence worker exiting");
        });

        Self {
            cmd_tx: Some(cmd_tx),
            cancelled,
            event_rx,
            thread: Some(handle),
        }
    }

    /// A client whose worker accepts requests but never runs them, so tests
    /// can feed outcomes by hand.
    #[cfg(test)]
    pub(crate) fn paused() -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (event_tx, event_rx) = channel::<PersistEvent>();
        let handle = thread::spawn(move || {
            let _events = event_tx;
            while let Ok(command) = cmd_rx.recv() {
                if let WorkerCommand::Shutdown = command {
                    break;
                }
            }
        });
        Self {
            cmd_tx: Some(cmd_tx),
            cancelled: Arc::new(AtomicBool::new(false)),
            event_rx,
            thread: Some(handle),
        }
    }

    /// Queue a request. Returns immediately.
    pub fn submit(&self, seq: u64, request: PersistRequest) -> ServiceResult<()> {
        match self.cmd_tx {
            Some(ref tx) => tx
                .send(WorkerCommand::Run { seq, request })
                .map_err(|_| ServiceError::Unavailable("persistence worker stopped".to_string())),
            None => Err(ServiceError::Unavailable(
                "persistence client shut down".to_string(),
            )),
        }
    }

    /// Drain completed requests (non-blocking).
    pub fn poll_events(&self) -> Vec<PersistEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next completed request.
    pub fn wait_event(&self, timeout: Duration) -> Option<PersistEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stop the worker after it finishes the requests already queued.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WorkerCommand::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Persistence worker panicked");
            }
        }
    }
}

impl Drop for PersistenceClient {
    fn drop(&mut self) {
        // A request already running finishes in the background.
        self.cancelled.store(true, Ordering::SeqCst);
        self.cmd_tx.take();
        if self.thread.take().is_some() {
            log::debug!("Persistence worker detached");
        }
    }
}

fn execute(service: &dyn ShapeService, request: &PersistRequest) -> PersistOutcome {
    let result = match request {
        PersistRequest::FetchAll => service.list().map(PersistOutcome::Fetched),
        PersistRequest::Create(record) => service.create(record).map(PersistOutcome::Created),
        PersistRequest::Delete(id) => service.delete(id).map(|_| PersistOutcome::Deleted),
    };
    result.unwrap_or_else(PersistOutcome::Failed)
}
