//! Configuration for the archiver service.
//!
//! Values come from defaults, then optional config files (`config/archiver`,
//! `/etc/asdex/archiver`), then `ARCHIVER__`-prefixed environment variables,
//! e.g. `ARCHIVER__OUTPUT__HEADERS=true` or
//! `ARCHIVER__ARCHIVE__WINDOW_SECS=3600`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by configuration validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no stations configured")]
    NoStations,

    #[error("duplicate station code: {0}")]
    DuplicateCode(String),

    #[error("station {0} has an empty marker")]
    EmptyMarker(String),
}

/// Main configuration for the archiver
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Service-level settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Output selection and entry composition
    #[serde(default)]
    pub output: OutputConfig,
    /// Archive engine settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Which output implementation the binary drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// The routing + bounded-window archive engine
    #[default]
    Archive,
    /// Single-stream passthrough to a message log file
    Logfile,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Prepend the raw header to every stored entry
    #[serde(default)]
    pub headers: bool,
    /// Selected output implementation
    #[serde(default)]
    pub kind: OutputKind,
}

/// Archive engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Directory for the per-station output files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Observation window per worker, in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Stations, checked in listed order when routing
    #[serde(default = "default_stations")]
    pub stations: Vec<StationConfig>,
}

/// One ground station: marker token and output file
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// Short code used in the output file name
    pub code: String,
    /// Substring that classifies a message to this station
    pub marker: String,
    /// Explicit output path; defaults to `<data_dir>/flight_data_<code>.json`
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl StationConfig {
    pub fn new(code: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            marker: marker.into(),
            output: None,
        }
    }

    /// Resolve this station's output file path.
    pub fn output_path(&self, data_dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| data_dir.join(format!("flight_data_{}.json", self.code)))
    }
}

fn default_service_name() -> String {
    "asdex-archiver".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_window_secs() -> u64 {
    7 * 60 * 60
}

fn default_stations() -> Vec<StationConfig> {
    vec![
        StationConfig::new("atl", "ATL"),
        StationConfig::new("clt", "CLT"),
    ]
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            window_secs: default_window_secs(),
            stations: default_stations(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, config files and environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/archiver").required(false))
            .add_source(config::File::with_name("/etc/asdex/archiver").required(false))
            .add_source(
                config::Environment::with_prefix("ARCHIVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }

    /// Get the observation window as a Duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.archive.window_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }
        for (i, station) in self.archive.stations.iter().enumerate() {
            if station.marker.is_empty() {
                return Err(ConfigError::EmptyMarker(station.code.clone()));
            }
            if self.archive.stations[..i]
                .iter()
                .any(|other| other.code == station.code)
            {
                return Err(ConfigError::DuplicateCode(station.code.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-wide; serialize the tests that
    // touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn load_succeeds_without_files_or_environment() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::load().unwrap();
        assert_eq!(config.archive.window_secs, default_window_secs());
        assert_eq!(config.archive.stations.len(), 2);
    }

    #[test]
    fn env_overrides_apply_with_archiver_prefix() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("ARCHIVER__ARCHIVE__WINDOW_SECS", "3600");
        std::env::set_var("ARCHIVER__OUTPUT__HEADERS", "true");

        let config = Config::load().unwrap();

        std::env::remove_var("ARCHIVER__ARCHIVE__WINDOW_SECS");
        std::env::remove_var("ARCHIVER__OUTPUT__HEADERS");

        assert_eq!(config.archive.window_secs, 3600);
        assert!(config.output.headers);
        // Untouched sections keep their defaults.
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn defaults_cover_the_two_station_deployment() {
        let config = Config::default();
        assert_eq!(config.archive.stations.len(), 2);
        assert_eq!(config.archive.stations[0].marker, "ATL");
        assert_eq!(config.archive.window_secs, 25200);
        assert_eq!(config.output.kind, OutputKind::Archive);
        assert!(!config.output.headers);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_apply_when_deserializing_an_empty_document() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.service.name, "asdex-archiver");
        assert_eq!(
            config
                .archive
                .stations
                .iter()
                .map(|s| s.code.as_str())
                .collect::<Vec<_>>(),
            vec!["atl", "clt"]
        );
    }

    #[test]
    fn station_output_path_defaults_to_data_dir_pattern() {
        let station = StationConfig::new("atl", "ATL");
        assert_eq!(
            station.output_path(Path::new("./data")),
            PathBuf::from("./data/flight_data_atl.json")
        );

        let explicit = StationConfig {
            output: Some(PathBuf::from("/tmp/atl.json")),
            ..StationConfig::new("atl", "ATL")
        };
        assert_eq!(
            explicit.output_path(Path::new("./data")),
            PathBuf::from("/tmp/atl.json")
        );
    }

    #[test]
    fn validate_rejects_bad_station_sets() {
        let mut config = Config::default();
        config.archive.stations.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoStations)));

        let mut config = Config::default();
        config.archive.stations.push(StationConfig::new("atl", "KATL"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCode(code)) if code == "atl"
        ));

        let mut config = Config::default();
        config.archive.stations[1].marker.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyMarker(code)) if code == "clt"
        ));
    }
}
