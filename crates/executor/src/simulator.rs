use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::Sender;
use tokio::time::{self, Duration};
use tracing::{debug, info};

use super::config::SimulatorConfig;
use super::error::Error;
use super::types::{SnapshotStreamer, TaggedSnapshot};
use arb_solver_core::PriceSnapshot;

/// Basis points per unit.
const BPS: f64 = 10_000.0;

/// Produces synthetic price snapshots for simulation purposes.
///
/// Every tick perturbs each configured base rate by a uniform random
/// fluctuation of at most `rate_fluctuation_bps` and sends the resulting
/// snapshot over a Tokio bounded channel.
pub struct SimulatorStreamer {
    pub config: SimulatorConfig,
}

impl SimulatorStreamer {
    pub fn new(config: SimulatorConfig) -> Self {
        SimulatorStreamer { config }
    }

    fn rng(&self) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }

    fn next_snapshot(&self, rng: &mut SmallRng) -> PriceSnapshot<String> {
        let max = self.config.rate_fluctuation_bps / BPS;

        self.config
            .base_rates
            .iter()
            .map(|base| {
                let fluctuation = if max > 0.0 {
                    rng.random_range(-max..=max)
                } else {
                    0.0
                };
                (base.from.clone(), base.to.clone(), base.rate * (1.0 + fluctuation))
            })
            .collect()
    }
}

#[async_trait]
impl SnapshotStreamer for SimulatorStreamer {
    /// Runs the simulation asynchronously.
    ///
    /// Backpressure is handled naturally via awaiting on `sender.send()`.
    /// Exits with `ChannelSendFailed` once the receiver is dropped.
    async fn run_stream(self, sender: Sender<TaggedSnapshot>) -> Result<(), Error> {
        let mut interval = time::interval(Duration::from_millis(self.config.interval_ms));
        let mut rng = self.rng();
        let mut sequence = 0u64;

        info!(
            pairs = self.config.base_rates.len(),
            interval_ms = self.config.interval_ms,
            "Simulator started"
        );

        loop {
            interval.tick().await;

            sequence += 1;
            let snapshot = self.next_snapshot(&mut rng);
            debug!(sequence, quotes = snapshot.len(), "Simulator produced snapshot");

            if sender.send(TaggedSnapshot { sequence, snapshot }).await.is_err() {
                info!("Simulator shutting down: Searcher receiver dropped.");
                return Err(Error::ChannelSendFailed);
            }
        }
    }
}
