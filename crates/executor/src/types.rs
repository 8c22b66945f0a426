use std::path::PathBuf;

use clap::Subcommand;
use tokio::sync::mpsc::Sender;

use super::error::Error;
use arb_solver_core::{Opportunity, PriceSnapshot};

/// A trait defining the contract for any source that produces price snapshots
/// and streams them into the main processing pipeline.
///
/// This trait is designed for **decoupling** the Producer task from the specific
/// data source (e.g., CSV replay vs. simulated data).
///
/// The trait bounds (`Send`, `Sync`, `'static`) are mandatory to ensure the
/// implementation can be safely executed by the multi-threaded asynchronous runtime (Tokio).
#[async_trait::async_trait]
pub trait SnapshotStreamer: Send + Sync + 'static {
    async fn run_stream(self, sender: Sender<TaggedSnapshot>) -> Result<(), Error>;
}

/// A merged price snapshot with the sequence number it was produced under.
#[derive(Debug, Clone)]
pub struct TaggedSnapshot {
    pub sequence: u64,
    pub snapshot: PriceSnapshot<String>,
}

/// One quote for an ordered pair as reported by a single venue.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueQuote {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub venue: String,
}

/// An opportunity together with the snapshot it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub sequence: u64,
    pub opportunity: Opportunity<String>,
}

/// Where price snapshots come from.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum DataSource {
    /// Run the simulated market from the `[simulator]` config section.
    Sim,
    /// Replay snapshots from a CSV file (`snapshot,from,to,rate,venue`).
    Csv {
        /// Path to the CSV file.
        path: PathBuf,
    },
}
