//! Drain worker: consumes one station's buffer for a bounded window and
//! writes the extracted records to that station's output file.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep_until, Instant};
use tracing::{error, info, warn};

use crate::buffer::{BufferError, PriorityBuffer};
use crate::report::Envelope;
use crate::sink::RecordSink;

/// Fatal worker failures. Everything else a worker encounters is logged and
/// survived; a dequeue failure is the one condition that brings the whole
/// process down.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("dequeue failed for station {station}: {source}")]
    Dequeue {
        station: String,
        #[source]
        source: BufferError,
    },
}

/// One long-lived drain task per station.
pub struct DrainWorker {
    station: String,
    buffer: Arc<PriorityBuffer>,
    sink: RecordSink,
    window: Duration,
}

impl DrainWorker {
    pub fn new(
        station: impl Into<String>,
        buffer: Arc<PriorityBuffer>,
        sink: RecordSink,
        window: Duration,
    ) -> Self {
        Self {
            station: station.into(),
            buffer,
            sink,
            window,
        }
    }

    /// Run the full worker lifecycle: open the framing, drain until the
    /// window elapses, close the framing.
    ///
    /// File I/O failures are logged and the affected write is lost. When the
    /// deadline fires the loop exits immediately; entries still buffered are
    /// not drained. `Err` is returned only for the fatal dequeue path, in
    /// which case the file is left unfinalized.
    pub async fn run(self) -> Result<(), WorkerError> {
        if let Err(e) = self.sink.open_frame().await {
            error!(station = %self.station, error = %e, "failed to open output frame");
        }

        let deadline = Instant::now() + self.window;
        info!(
            station = %self.station,
            window_secs = self.window.as_secs(),
            path = %self.sink.path().display(),
            "drain worker started"
        );

        let mut written = 0usize;
        loop {
            // The deadline branch is checked first so a zero or elapsed
            // window finishes the worker even with entries ready.
            let entry = tokio::select! {
                biased;
                _ = sleep_until(deadline) => break,
                taken = self.buffer.take() => match taken {
                    Ok(entry) => entry,
                    Err(source) => {
                        return Err(WorkerError::Dequeue {
                            station: self.station.clone(),
                            source,
                        });
                    }
                },
            };

            let envelope = match Envelope::decode(&entry) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(station = %self.station, error = %e, "skipping entry");
                    continue;
                }
            };

            for record in envelope.position_records() {
                match self.sink.append(&record).await {
                    Ok(()) => written += 1,
                    Err(e) => {
                        error!(station = %self.station, error = %e, "record write lost");
                    }
                }
            }
        }

        if let Err(e) = self.sink.close_frame().await {
            error!(station = %self.station, error = %e, "failed to close output frame");
        }
        info!(
            station = %self.station,
            records = written,
            remaining = self.buffer.len(),
            "drain worker finalized"
        );
        Ok(())
    }
}
