//! # Strata Server
//!
//! This is the main entry point for the **strata** storage server.
//!
//! The server is composed of multiple internal components organized under
//! the `/crates` directory of this workspace:
//!
//! - `/storage`: the page model, the disk managers and the buffer pool.
//!
//! The binary opens the database file, hosts a buffer pool with the configured replacement policy and
//! keeps dirty pages flowing to disk in the background until it is asked to stop.

use crate::config::EngineConfig;
use crate::engine_environment::EngineEnvironment;
use buffer::replacer::{ClockReplacer, LruReplacer, Replacer, ReplacerPolicy};
use std::error::Error;
use std::path::Path;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

mod config;
mod engine_environment;
mod flusher;

const DEFAULT_CONFIG: &str = "strata.toml";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = match EngineConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let logging_guard = match init_logging(&config.storage.logs_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e}");
            std::process::exit(1);
        }
    };

    // The policy is bound once, here, for the lifetime of the pool.
    let result = match config.storage.replacer {
        ReplacerPolicy::Lru => run::<LruReplacer>(config).await,
        ReplacerPolicy::Clock => run::<ClockReplacer>(config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "server stopped with an error");
        drop(logging_guard);
        std::process::exit(1);
    }

    tracing::info!("shutdown complete");
    drop(logging_guard);
}

async fn run<R: Replacer + 'static>(
    config: EngineConfig,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env = EngineEnvironment::<R>::new(config)?;
    tracing::info!(
        path = %env.disk_manager.path().display(),
        pages_on_disk = env.disk_manager.num_pages(),
        pool_size = env.buffer.pool_size(),
        replacer = %env.engine_config.storage.replacer,
        "buffer pool ready"
    );

    let shutdown = CancellationToken::new();

    // Spawn a task that waits for OS shutdown signals and triggers cancellation.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal().await {
                tracing::error!("unable to listen for shutdown signals: {e}");
            }
            tracing::info!("shutdown signal received; beginning graceful shutdown");
            shutdown.cancel();
        });
    }

    let flusher = tokio::spawn(flusher::run_flusher(
        env.buffer.clone(),
        env.engine_config.storage.flush_interval(),
        shutdown.clone(),
    ));

    shutdown.cancelled().await;

    if let Err(join_err) = flusher.await {
        tracing::warn!("flusher task ended with error: {join_err}");
    }

    tracing::info!("flushing buffer pool");
    task::spawn_blocking(move || env.shutdown()).await??;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Sets up the logging for the server
pub fn init_logging(
    log_dir: impl AsRef<Path>,
) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    let file_appender = tracing_appender::rolling::daily(log_dir, "strata.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
