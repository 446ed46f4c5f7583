//! Process-wide shutdown coordination.
//!
//! Workers never terminate the process themselves: each reports its outcome
//! over a channel, and the coordinator owns the single exit decision. The
//! receive loop serializes the finalization tally, so two workers finishing
//! at the same instant cannot lose an update or trigger a double exit.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::worker::WorkerError;

/// Terminal failures surfaced by the coordinator
#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("worker for station {station} failed: {source}")]
    WorkerFailed {
        station: String,
        #[source]
        source: WorkerError,
    },

    #[error("a worker exited without reporting completion")]
    WorkerVanished,
}

/// Outcome of one worker's full lifecycle.
#[derive(Debug)]
pub struct WorkerReport {
    pub station: String,
    pub outcome: Result<(), WorkerError>,
}

/// Sender handed to each spawned worker.
pub type ReportSender = mpsc::UnboundedSender<WorkerReport>;

/// Counts finalized workers and resolves the process outcome exactly once.
pub struct ShutdownCoordinator {
    total: usize,
    reports: mpsc::UnboundedReceiver<WorkerReport>,
}

impl ShutdownCoordinator {
    pub fn new(total: usize) -> (Self, ReportSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { total, reports: rx }, tx)
    }

    /// Wait until every worker has finalized, or fail immediately on the
    /// first fatal worker report without waiting for the rest.
    pub async fn wait(mut self) -> Result<(), ShutdownError> {
        let mut finalized = 0usize;
        while finalized < self.total {
            match self.reports.recv().await {
                Some(WorkerReport {
                    station,
                    outcome: Ok(()),
                }) => {
                    finalized += 1;
                    info!(station = %station, finalized, total = self.total, "worker finalized");
                }
                Some(WorkerReport {
                    station,
                    outcome: Err(source),
                }) => {
                    error!(station = %station, error = %source, "worker reported fatal error");
                    return Err(ShutdownError::WorkerFailed { station, source });
                }
                None => return Err(ShutdownError::WorkerVanished),
            }
        }
        Ok(())
    }
}
