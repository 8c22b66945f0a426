pub mod aggregator;
pub mod config;
pub mod csv_streamer;
pub mod error;
pub mod producer;
pub mod reporter;
pub mod searcher;
pub mod simulator;
pub mod types;

use std::fmt::Debug;
use std::path::PathBuf;

use clap::Parser;
use tokio::sync::{mpsc, mpsc::Receiver, mpsc::Sender, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use csv_streamer::CsvStreamer;
use error::Error;
use producer::Producer;
use reporter::Reporter;
use searcher::ArbSearcher;
use simulator::SimulatorStreamer;
use types::{DataSource, Finding, TaggedSnapshot};

const DEFAULT_CONFIG_PATH: &str = "crates/executor/Config.toml";

/// Streams price snapshots through the arbitrage engine and reports profitable loops.
#[derive(Debug, Parser)]
#[command(name = "executor", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    source: DataSource,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config).inspect_err(|e| {
        error!(path = %cli.config.display(), error = %e, "Failed to load config");
    })?;

    let (snapshot_tx, snapshot_rx) = mpsc::channel::<TaggedSnapshot>(config.channel.buffer_size);
    let (finding_tx, finding_rx) = mpsc::channel::<Finding>(config.channel.buffer_size);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn tasks
    let producer_handle = spawn_producer(&cli.source, snapshot_tx, &config);
    let searcher_handle = spawn_searcher(snapshot_rx, finding_tx, shutdown_rx.clone(), &config);
    let reporter_handle = Reporter::new(finding_rx, shutdown_rx).spawn_task();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down pipeline.");
            let _ = shutdown_tx.send(true);
        }
    });

    let (producer, searcher, reporter) =
        tokio::join!(producer_handle, searcher_handle, reporter_handle);

    log_outcome("Producer", producer);
    log_outcome("Searcher", searcher);
    log_outcome("Reporter", reporter);

    info!("Pipeline shut down.");
    Ok(())
}

pub fn spawn_producer(
    source: &DataSource,
    sender: Sender<TaggedSnapshot>,
    config: &config::Config,
) -> JoinHandle<Result<(), Error>> {
    match source {
        DataSource::Sim => {
            info!("Starting SimulatorStreamer producer task...");
            let streamer = SimulatorStreamer::new(config.simulator.clone());
            Producer::new(streamer).spawn(sender)
        }
        DataSource::Csv { path } => {
            info!(path = %path.display(), "Starting CsvStreamer producer task...");
            let streamer = CsvStreamer::new(path.clone());
            Producer::new(streamer).spawn(sender)
        }
    }
}

/// Spawn searcher task
fn spawn_searcher(
    receiver: Receiver<TaggedSnapshot>,
    sender: Sender<Finding>,
    shutdown: watch::Receiver<bool>,
    config: &config::Config,
) -> JoinHandle<Result<(), Error>> {
    let searcher = ArbSearcher::new(&config.searcher);
    tokio::spawn(searcher.search_for_arbs(receiver, sender, shutdown))
}

fn log_outcome<T: Debug>(task: &str, outcome: Result<Result<T, Error>, tokio::task::JoinError>) {
    match outcome {
        Ok(Ok(value)) => info!(task, result = ?value, "Task finished"),
        Ok(Err(e)) => warn!(task, error = %e, "Task stopped with error"),
        Err(e) => error!(task, error = %e, "Task panicked or was cancelled"),
    }
}
