//! Clinic sync client.
//!
//! Syncs the local clinic database with the server from the command line:
//!
//! Usage:
//!   clinic-sync --config client.json sync
//!   clinic-sync --database clinic.db status
//!   clinic-sync --server https://api.example.org watch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clinic_cli::{Client, ClientConfig, any_failed, format_reports, format_status};
use clinic_sync::{SyncGroup, SyncScheduler};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "clinic-sync")]
#[command(about = "Sync clinic records with the server")]
struct Args {
    /// Path to a JSON client config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file (overrides the config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Server base URL (overrides the config)
    #[arg(short, long)]
    server: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one sync and print the outcome of every entity
    Sync {
        /// Only sync this group (frequent or daily)
        #[arg(short, long)]
        group: Option<SyncGroup>,
    },
    /// Print pending and total record counts
    Status,
    /// Keep syncing on schedule until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = ClientConfig::load_or_default(args.config.as_deref())?
        .with_overrides(args.database, args.server);
    let client = Client::open(&config)?;

    match args.command {
        Command::Sync { group } => {
            let reports = match group {
                Some(group) => client.data_sync.sync(group).await,
                None => client.data_sync.sync_the_world().await,
            };
            print!("{}", format_reports(&reports));
            if any_failed(&reports) {
                anyhow::bail!("some syncs failed");
            }
        }
        Command::Status => {
            print!("{}", format_status(&client.status()?));
        }
        Command::Watch => watch_until_interrupted(&client).await?,
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .compact()
            .init();
        return;
    }

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();
}

async fn watch_until_interrupted(client: &Client) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handles: Vec<_> = SyncGroup::ALL
        .into_iter()
        .map(|group| {
            SyncScheduler::new(client.data_sync.clone(), group).spawn(shutdown_rx.clone())
        })
        .collect();

    info!("Watching for changes, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Scheduler task failed: {}", e);
        }
    }
    Ok(())
}
