//! Node binary: owns the namespace, the snapshot file, and (outside
//! single-node mode) the replication apply loop.
//!
//! Startup/shutdown sequence mirrors `cmd/raft_server/basalt.go`: create the
//! data file if it does not exist, restore from it if it does, install the
//! log driver, serve until interrupted, save a final snapshot on the way
//! out.

mod cli;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bitset_engine::Namespace;
use bitset_replication::{ApplyLoop, LoopbackDriver};

use cli::Cli;
use error::{CliError, Result};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "bitset-cli exiting with error");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<()> {
    let namespace = Namespace::new();
    namespace.configure_snapshot_path(&cli.data);
    namespace
        .restore_from_configured_path()
        .map_err(|source| CliError::SnapshotLoad {
            path: cli.data.clone(),
            source,
        })?;

    let apply_loop = if cli.is_clustered() {
        tracing::info!(
            id = cli.id,
            peers = ?cli.peer_list(),
            join = cli.join,
            "starting in clustered mode (loopback driver stands in for consensus)"
        );
        let driver = LoopbackDriver::spawn();
        Some(ApplyLoop::spawn(namespace.clone(), driver)?)
    } else {
        tracing::info!(addr = %cli.addr, "starting in single-node mode");
        None
    };

    tracing::info!(addr = %cli.addr, data = %cli.data.display(), "bitset-cli ready");

    match apply_loop {
        Some(apply_loop) => {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|err| CliError::Other(err.into()))?;
                    tracing::info!("received shutdown signal, saving snapshot");
                }
                result = apply_loop.join() => {
                    // The loop only ever returns on a fatal error; a healthy
                    // loop runs until the process exits via the signal arm.
                    result?;
                }
            }
        }
        None => {
            tokio::signal::ctrl_c()
                .await
                .map_err(|err| CliError::Other(err.into()))?;
            tracing::info!("received shutdown signal, saving snapshot");
        }
    }

    namespace.save().map_err(|source| CliError::SnapshotSave {
        path: cli.data.clone(),
        source,
    })?;

    Ok(())
}
