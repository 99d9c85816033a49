//! # AudWatch CLI
//!
//! Polls exchangerate-api.com for the AUD rate and delivers a daily report
//! to the console, local files, and (optionally) email.
//!
//! Usage:
//!   audwatch once                      # Fetch and notify once, then exit
//!   audwatch watch                     # Run now, then daily at send_time
//!   audwatch --config my.json watch    # Use another config file

use anyhow::Result;
use audwatch_agent::{AppContext, Monitor};
use audwatch_core::store::RateStore;
use audwatch_scheduler::SchedulerEngine;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "audwatch",
    version,
    about = "AUD exchange-rate monitor with daily notifications"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = audwatch_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory for daily_rates.txt, rates_history.json and aud_rate.log
    #[arg(short, long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the rate and notify once
    Once,

    /// Run once now, then every day at the configured send time
    Watch,
}

fn init_logging(verbose: bool, store: &RateStore) {
    let filter = if verbose {
        "audwatch=debug,audwatch_core=debug,audwatch_agent=debug,audwatch_providers=debug,audwatch_channels=debug,audwatch_scheduler=debug"
    } else {
        "audwatch=info,audwatch_core=info,audwatch_agent=info,audwatch_providers=info,audwatch_channels=info,audwatch_scheduler=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Operational log file; console-only if it cannot be opened.
    let file_layer = std::fs::create_dir_all(store.dir())
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(store.operations_log_path())
        })
        .map_err(|e| eprintln!("Cannot open {}: {e}", store.operations_log_path().display()))
        .ok()
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let context = AppContext::load(&cli.config, &cli.data_dir);
    let send_time = context.config().send_time();
    let monitor = Monitor::new(context)?;

    match cli.command {
        Commands::Once => {
            tracing::info!("Running AUD rate task once");
            monitor.run_daily_task().await;
        }
        Commands::Watch => {
            tracing::info!("🦘 AudWatch v{} starting", env!("CARGO_PKG_VERSION"));
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Cannot listen for Ctrl+C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            SchedulerEngine::new(monitor, send_time)
                .run_until(shutdown)
                .await;
            tracing::info!("👋 AudWatch stopped by user");
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, &RateStore::new(&cli.data_dir));

    // Catch-all: a failed run is logged, never an unhandled exit.
    if let Err(e) = run(cli).await {
        tracing::error!("AudWatch failed: {e:#}");
    }
    Ok(())
}
