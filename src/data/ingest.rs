use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::{error, info};

use super::error::IngestError;
use super::loader;
use super::model::Dataset;
use super::source::TextSource;

// ---------------------------------------------------------------------------
// Background load
// ---------------------------------------------------------------------------

/// A load running on its own thread. Poll it once per frame.
pub struct PendingLoad {
    location: String,
    rx: Receiver<Result<Dataset, IngestError>>,
}

impl PendingLoad {
    /// Start loading `source` on a background thread.
    pub fn spawn(source: Box<dyn TextSource>) -> Self {
        let location = source.describe();
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("csv-loader".into())
            .spawn(move || {
                // The receiver may already be gone if the user opened
                // another file; nothing to report in that case.
                let _ = tx.send(loader::load(source.as_ref()));
            });
        if let Err(e) = spawned {
            error!("Could not start loader thread: {e}");
        }
        info!("Loading {location}");
        PendingLoad { location, rx }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// `None` while the load is still running.
    pub fn poll(&self) -> Option<Result<Dataset, IngestError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.loader_gone())),
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<Dataset, IngestError> {
        self.rx.recv().unwrap_or_else(|_| Err(self.loader_gone()))
    }

    fn loader_gone(&self) -> IngestError {
        IngestError::SourceUnavailable {
            location: self.location.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "loader stopped without producing a result",
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestion state machine: Pending → Ready | Failed
// ---------------------------------------------------------------------------

#[derive(Default)]
pub enum IngestState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Pending(PendingLoad),
    Ready(Arc<Dataset>),
    /// Terminal for this load; a new load must be started explicitly.
    Failed(IngestError),
}

impl IngestState {
    pub fn start(source: Box<dyn TextSource>) -> Self {
        IngestState::Pending(PendingLoad::spawn(source))
    }

    /// Advance a pending load. Returns `true` when the state changed.
    pub fn poll(&mut self) -> bool {
        let IngestState::Pending(pending) = self else {
            return false;
        };
        let Some(result) = pending.poll() else {
            return false;
        };
        let location = pending.location().to_string();
        *self = match result {
            Ok(dataset) => IngestState::Ready(Arc::new(dataset)),
            Err(e) => {
                error!("Failed to load {location}: {e}");
                IngestState::Failed(e)
            }
        };
        true
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, IngestState::Pending(_))
    }

    /// The dataset, only once the load has succeeded.
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            IngestState::Ready(ds) => Some(ds),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&IngestError> {
        match self {
            IngestState::Failed(e) => Some(e),
            _ => None,
        }
    }
}
