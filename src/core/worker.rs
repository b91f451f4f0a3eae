use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::bulk::BatchRunner;
use crate::core::metadata::{self, MetadataTool};
use crate::models::{BatchOperation, BatchReport, MetadataRecord, ProgressEvent};

/// Jobs waiting behind the running one. Keeps at most one tool process busy.
const JOB_QUEUE_DEPTH: usize = 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ToolJob {
    Read(PathBuf),
    Batch {
        files: Vec<PathBuf>,
        operation: BatchOperation,
    },
}

#[derive(Debug)]
pub enum ToolOutcome {
    Loaded {
        path: PathBuf,
        result: metadata::Result<MetadataRecord>,
    },
    Progress(ProgressEvent),
    BatchFinished(BatchReport),
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum WorkerError {
    #[error("a tool job is already waiting")]
    Busy,
    #[error("the tool worker has stopped")]
    Stopped,
    #[error("no outcome arrived in time")]
    Pending,
}

/// Runs tool calls on one background thread and hands results back over a
/// channel. The owner applies `Loaded` outcomes to its session itself, so the
/// record is never touched from the worker thread.
pub struct ToolWorker {
    jobs: Option<SyncSender<ToolJob>>,
    outcomes: Receiver<ToolOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl ToolWorker {
    pub fn spawn(tool: Arc<dyn MetadataTool>) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::sync_channel(JOB_QUEUE_DEPTH);
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(String::from("exiftool-worker"))
            .spawn(move || worker_loop(tool, job_rx, outcome_tx))?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, job: ToolJob) -> Result<(), WorkerError> {
        let Some(jobs) = &self.jobs else {
            return Err(WorkerError::Stopped);
        };

        match jobs.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(WorkerError::Busy),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Stopped),
        }
    }

    pub fn try_recv(&self) -> Option<ToolOutcome> {
        self.outcomes.try_recv().ok()
    }

    pub fn recv(&self) -> Option<ToolOutcome> {
        self.outcomes.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<ToolOutcome, WorkerError> {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(WorkerError::Pending),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Stopped),
        }
    }
}

impl Drop for ToolWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("tool worker panicked");
            }
        }
    }
}

fn worker_loop(tool: Arc<dyn MetadataTool>, jobs: Receiver<ToolJob>, outcomes: Sender<ToolOutcome>) {
    for job in jobs {
        match job {
            ToolJob::Read(path) => {
                let result = tool.read_metadata(&path);
                if outcomes.send(ToolOutcome::Loaded { path, result }).is_err() {
                    break;
                }
            }
            ToolJob::Batch { files, operation } => {
                let mut runner = BatchRunner::new(tool.as_ref());
                let report = runner.run(&files, &operation, |event| {
                    let _ = outcomes.send(ToolOutcome::Progress(event.clone()));
                });
                if outcomes.send(ToolOutcome::BatchFinished(report)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("tool worker exiting");
}
