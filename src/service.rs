//! Wiring of the archive engine: buffers, workers, router, coordinator.

use std::sync::Arc;

use tracing::info;

use crate::buffer::PriorityBuffer;
use crate::config::{Config, ConfigError};
use crate::coordinator::{ShutdownCoordinator, ShutdownError, WorkerReport};
use crate::output::ConvertFn;
use crate::router::{Route, Router};
use crate::sink::RecordSink;
use crate::worker::DrainWorker;

/// The assembled archive engine.
///
/// `start` spawns one drain worker per configured station; the returned
/// handle exposes the router for the transport side and `wait` for the
/// process outcome. Must be called from within a tokio runtime.
pub struct Archiver {
    router: Arc<Router>,
    coordinator: ShutdownCoordinator,
}

impl Archiver {
    pub fn start(config: &Config, convert: ConvertFn) -> Result<Self, ConfigError> {
        config.validate()?;

        let stations = &config.archive.stations;
        let (coordinator, reports) = ShutdownCoordinator::new(stations.len());

        let mut routes = Vec::with_capacity(stations.len());
        for station in stations {
            let buffer = Arc::new(PriorityBuffer::new());
            let sink = RecordSink::new(station.output_path(&config.archive.data_dir));
            let worker = DrainWorker::new(
                station.code.clone(),
                buffer.clone(),
                sink,
                config.window(),
            );

            let reports = reports.clone();
            let code = station.code.clone();
            tokio::spawn(async move {
                let outcome = worker.run().await;
                let _ = reports.send(WorkerReport {
                    station: code,
                    outcome,
                });
            });

            routes.push(Route::new(
                station.code.clone(),
                station.marker.clone(),
                buffer,
            ));
        }

        info!(stations = stations.len(), "archive workers started");
        Ok(Self {
            router: Arc::new(Router::new(routes, config.output.headers, convert)),
            coordinator,
        })
    }

    /// Handle for the transport side to feed messages through.
    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// Resolve the process outcome: `Ok` once every station has finalized
    /// its file, `Err` immediately on a fatal worker failure.
    pub async fn wait(self) -> Result<(), ShutdownError> {
        self.coordinator.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::output::identity_convert;

    #[tokio::test]
    async fn start_rejects_invalid_station_sets() {
        let mut config = Config::default();
        config.archive.stations.clear();
        assert!(Archiver::start(&config, identity_convert()).is_err());
    }

    #[tokio::test]
    async fn zero_window_run_finalizes_every_station() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.archive.data_dir = dir.path().to_path_buf();
        config.archive.window_secs = 0;
        config.archive.stations = vec![
            StationConfig::new("atl", "ATL"),
            StationConfig::new("clt", "CLT"),
        ];

        let archiver = Archiver::start(&config, identity_convert()).unwrap();
        archiver.wait().await.unwrap();

        for code in ["atl", "clt"] {
            let path = dir.path().join(format!("flight_data_{code}.json"));
            let content = std::fs::read_to_string(path).unwrap();
            assert_eq!(content, "{\"data\": [\n]}");
        }
    }
}
