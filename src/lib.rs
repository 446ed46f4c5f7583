//! ASDE-X Archiver - bounded-window JSON archiver for surface surveillance feeds
//!
//! This library routes inbound surveillance messages to per-station buffers
//! and drains each buffer on a dedicated worker for a fixed observation
//! window, persisting the extracted position reports as a framed JSON array
//! file per station. It handles:
//!
//! - Marker-based classification of messages to ground stations
//! - Lexicographically ordered, unbounded per-station buffering
//! - Bounded-duration drain workers with per-record file appends
//! - A single shutdown coordinator that owns the process outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use asdex_archiver::{Archiver, Config};
//! use asdex_archiver::output::identity_convert;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let archiver = Archiver::start(&config, identity_convert())?;
//!
//!     let router = archiver.router();
//!     router.route(r#"{"ns2:asdexMsg":{}}"#, "dest=ATL");
//!
//!     archiver.wait().await?;
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod fallback;
pub mod output;
pub mod report;
pub mod router;
pub mod service;
pub mod sink;
pub mod worker;

// Re-export main types
pub use buffer::{BufferError, PriorityBuffer};
pub use config::{ArchiveConfig, Config, ConfigError, OutputConfig, OutputKind, StationConfig};
pub use coordinator::{ReportSender, ShutdownCoordinator, ShutdownError, WorkerReport};
pub use fallback::LogFileOutput;
pub use output::{ConvertFn, Output};
pub use report::{Envelope, PositionRecord, ReportError};
pub use router::{Route, Router};
pub use service::Archiver;
pub use sink::{RecordSink, SinkError};
pub use worker::{DrainWorker, WorkerError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, OutputKind, StationConfig};
    pub use crate::output::{identity_convert, ConvertFn, Output};
    pub use crate::router::Router;
    pub use crate::service::Archiver;
}
