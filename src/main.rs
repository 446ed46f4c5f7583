use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asdex_archiver::fallback::{LogFileOutput, DEFAULT_LOG_PATH};
use asdex_archiver::output::{identity_convert, Output};
use asdex_archiver::{Archiver, Config, OutputKind};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        "Starting ASDE-X archiver"
    );

    match config.output.kind {
        OutputKind::Archive => run_archive(config).await,
        OutputKind::Logfile => run_logfile(config).await,
    }
}

/// Run the routing + bounded-window archive engine until every station's
/// worker has finalized. A fatal worker failure surfaces as an error here,
/// which exits the process with a non-zero status.
async fn run_archive(config: Config) -> Result<()> {
    let archiver =
        Archiver::start(&config, identity_convert()).context("Failed to start archive workers")?;

    let router = archiver.router();
    tokio::spawn(async move {
        feed_lines(router).await;
    });

    archiver.wait().await.context("Archive run aborted")?;
    info!("All stations finalized");
    Ok(())
}

/// Run the single-stream fallback sink until the source closes.
async fn run_logfile(config: Config) -> Result<()> {
    let output = Arc::new(LogFileOutput::new(
        DEFAULT_LOG_PATH,
        config.output.headers,
        identity_convert(),
    ));

    feed_lines(output).await;
    Ok(())
}

/// Trivial transport adapter: each stdin line is one message with an empty
/// header. Real deployments call `Output::output` from their own transport.
async fn feed_lines<O: Output + ?Sized>(output: Arc<O>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => output.output(&line, ""),
            Ok(None) => {
                info!("message source closed");
                return;
            }
            Err(e) => {
                error!(error = %e, "failed to read from message source");
                return;
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
