use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use super::config::SearcherConfig;
use super::error::Error;
use super::types::{Finding, TaggedSnapshot};
use arb_solver_core::{ArbitrageEngine, BellmanFordSolver, CycleDetector};

/// Async consumer that runs one detection per incoming snapshot.
///
/// Detection is CPU-bound, so each scan runs on the blocking pool under a
/// deadline. A scan that overruns is reported and abandoned; its result is
/// never forwarded.
pub struct ArbSearcher<D = BellmanFordSolver> {
    engine: Arc<ArbitrageEngine<D>>,
    source: String,
    timeout: Duration,
    skip_stale: bool,
}

impl ArbSearcher<BellmanFordSolver> {
    pub fn new(config: &SearcherConfig) -> Self {
        Self::with_engine(
            ArbitrageEngine::new(config.engine),
            config.source_asset.clone(),
            Duration::from_millis(config.timeout_ms),
            config.skip_stale,
        )
    }
}

impl<D> ArbSearcher<D>
where
    D: CycleDetector + Send + Sync + 'static,
{
    pub fn with_engine(
        engine: ArbitrageEngine<D>,
        source: String,
        timeout: Duration,
        skip_stale: bool,
    ) -> Self {
        ArbSearcher {
            engine: Arc::new(engine),
            source,
            timeout,
            skip_stale,
        }
    }

    /// Scans snapshots until the stream closes or shutdown is signalled.
    ///
    /// With `skip_stale` set, snapshots that queued up behind a slow scan are
    /// dropped in favour of the newest one. Per-snapshot failures are logged
    /// and do not stop the loop; a closed findings channel does.
    pub async fn search_for_arbs(
        self,
        mut receiver: Receiver<TaggedSnapshot>,
        sender: Sender<Finding>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), Error> {
        info!(source = %self.source, timeout = ?self.timeout, "Searcher ready.");

        let mut scanned = 0u64;

        loop {
            select! {
                maybe_snapshot = receiver.recv() => {
                    let Some(mut tagged) = maybe_snapshot else {
                        info!(scanned, "Snapshot stream closed, shutting down searcher.");
                        break;
                    };

                    if self.skip_stale {
                        let mut skipped = 0usize;
                        while let Ok(newer) = receiver.try_recv() {
                            tagged = newer;
                            skipped += 1;
                        }
                        if skipped > 0 {
                            debug!(skipped, sequence = tagged.sequence, "Skipped stale snapshots");
                        }
                    }

                    scanned += 1;
                    match self.scan(tagged).await {
                        Ok(Some(finding)) => {
                            if sender.send(finding).await.is_err() {
                                warn!("Searcher shutting down: Reporter receiver dropped.");
                                return Err(Error::ChannelSendFailed);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "Search failed. Continuing.");
                        }
                    }
                }

                Ok(()) = shutdown.changed() => {
                    info!(scanned, "Shutdown signal received, stopping searcher.");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Runs the engine over one snapshot on the blocking pool.
    pub async fn scan(&self, tagged: TaggedSnapshot) -> Result<Option<Finding>, Error> {
        let engine = Arc::clone(&self.engine);
        let source = self.source.clone();
        let sequence = tagged.sequence;

        let task = tokio::task::spawn_blocking(move || {
            engine.find_opportunity(&tagged.snapshot, &source)
        });

        let opportunity = match time::timeout(self.timeout, task).await {
            Err(_) => return Err(Error::SearchTimedOut(sequence)),
            Ok(Err(join_error)) => return Err(Error::TaskFailed(join_error.to_string())),
            Ok(Ok(result)) => result?,
        };

        match &opportunity {
            Some(opportunity) => debug!(sequence, route = %opportunity, "Snapshot scanned"),
            None => debug!(sequence, "Snapshot scanned: no arbitrage opportunities."),
        }

        Ok(opportunity.map(|opportunity| Finding {
            sequence,
            opportunity,
        }))
    }
}
