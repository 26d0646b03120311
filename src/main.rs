//! colkeeper
//!
//! Command-line entry point: load a page, run content actions against it,
//! validate configuration.

mod cli;
mod cmd_config;
mod cmd_dispatch;

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use colkeeper_config::{Config, ConfigLoader};

use crate::cli::{Cli, Commands};
use crate::cmd_config::handle_check_config;
use crate::cmd_dispatch::{DispatchArgs, handle_dispatch};

/// Initialize tracing with console and rolling file output.
///
/// The console layer writes to stderr so stdout carries only command output.
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = config.log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("colkeeper")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    init_tracing(&config)?;
    info!("colkeeper v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Dispatch {
            page,
            url,
            action,
            data,
            apply_saved,
            watch_ms,
            dump,
            api_key,
        } => {
            if let Some(key) = api_key {
                config.ai.api_key = Some(key);
            }
            let args = DispatchArgs {
                page: &page,
                url: &url,
                action: &action,
                data: data.as_deref(),
                apply_saved,
                watch: watch_ms.map(Duration::from_millis),
                dump,
            };
            handle_dispatch(&config, args).await
        }
        Commands::CheckConfig => handle_check_config(&cli.config, &config),
    }
}
