use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch;
use tracing::info;

use super::error::Error;
use super::types::Finding;

/// Totals gathered by a [`Reporter`] over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportSummary {
    pub findings: u64,
    pub best_profit_ratio: Option<f64>,
}

/// Async consumer that reports every finding the searcher forwards.
pub struct Reporter {
    receiver: Receiver<Finding>,
    shutdown: watch::Receiver<bool>, // signal for graceful shutdown
}

impl Reporter {
    pub fn new(receiver: Receiver<Finding>, shutdown: watch::Receiver<bool>) -> Self {
        Self { receiver, shutdown }
    }

    /// Run the reporter asynchronously.
    ///
    /// Exits gracefully when the receiver is closed or shutdown signal is received.
    pub async fn process_findings(mut self) -> Result<ReportSummary, Error> {
        info!("Reporter ready.");

        let mut summary = ReportSummary::default();

        loop {
            select! {
                finding = self.receiver.recv() => {
                    match finding {
                        Some(finding) => {
                            let profit_ratio = finding.opportunity.profit_ratio();
                            info!(
                                sequence = finding.sequence,
                                route = %finding.opportunity,
                                hops = finding.opportunity.hop_count(),
                                profit_ratio,
                                "Cycle FOUND!"
                            );

                            summary.findings += 1;
                            summary.best_profit_ratio = Some(
                                summary
                                    .best_profit_ratio
                                    .map_or(profit_ratio, |best| best.max(profit_ratio)),
                            );
                        }
                        None => {
                            info!("Receiver closed, shutting down reporter.");
                            break;
                        }
                    }
                }

                Ok(()) = self.shutdown.changed() => {
                    info!("Shutdown signal received, stopping reporter.");
                    break;
                }
            }
        }

        info!(
            findings = summary.findings,
            best_profit_ratio = summary.best_profit_ratio,
            "Reporter finished."
        );

        Ok(summary)
    }

    /// Spawns the Reporter task onto the Tokio runtime.
    pub fn spawn_task(self) -> tokio::task::JoinHandle<Result<ReportSummary, Error>> {
        tokio::spawn(self.process_findings())
    }
}
