use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info};

use super::aggregator::QuoteAggregator;
use super::error::Error;
use super::types::{SnapshotStreamer, TaggedSnapshot, VenueQuote};

// Helper struct for CSV parsing
#[derive(Debug, Deserialize, Default)]
pub struct CsvRecord {
    #[serde(rename = "snapshot")]
    pub snapshot_id: u64,

    #[serde(rename = "from")]
    pub from_asset: String,

    #[serde(rename = "to")]
    pub to_asset: String,

    #[serde(rename = "rate")]
    pub rate_value: f64,

    #[serde(rename = "venue")]
    pub venue: String,
}

/// Replays recorded venue quotes as a sequence of merged snapshots.
///
/// Rows sharing a `snapshot` id form one snapshot; snapshots are emitted in
/// ascending id order.
pub struct CsvStreamer {
    path: PathBuf,
}

impl CsvStreamer {
    pub fn new(path: PathBuf) -> Self {
        CsvStreamer { path }
    }

    fn parse_csv_to_snapshots(&self) -> Result<Vec<TaggedSnapshot>, Error> {
        let file = File::open(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to read file");
            Error::IoError(e)
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut groups: BTreeMap<u64, QuoteAggregator> = BTreeMap::new();

        for result in rdr.deserialize() {
            let record: CsvRecord = result?;
            groups.entry(record.snapshot_id).or_default().push(VenueQuote {
                from: record.from_asset,
                to: record.to_asset,
                rate: record.rate_value,
                venue: record.venue,
            });
        }

        Ok(groups
            .into_iter()
            .map(|(sequence, aggregator)| {
                debug!(sequence, pairs = aggregator.len(), "Merging venue quotes");
                TaggedSnapshot {
                    sequence,
                    snapshot: aggregator.into_snapshot(),
                }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl SnapshotStreamer for CsvStreamer {
    async fn run_stream(self, sender: Sender<TaggedSnapshot>) -> Result<(), Error> {
        let snapshots = tokio::task::spawn_blocking(move || self.parse_csv_to_snapshots())
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))??;
        let total = snapshots.len();

        info!(total, "CsvStreamer: Starting replay of snapshots...");

        for snapshot in snapshots {
            if let Err(e) = sender.send(snapshot).await {
                error!(
                    error = %e,
                    "CsvStreamer shutting down: Searcher receiver dropped during send."
                );
                return Err(Error::ChannelSendFailed);
            }
        }

        info!(total, "CsvStreamer: Successfully replayed snapshots.");
        Ok(())
    }
}
