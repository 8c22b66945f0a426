use super::csr::GraphCSR;
use super::solver::Detection;
use common::error::Error;

/// Trait for graph solvers capable of detecting negative cycles.
pub trait CycleDetector {
    /// Relaxes `graph` starting from node `source`.
    ///
    /// Returns the final distance and predecessor tables together with a
    /// witness node when a negative cycle was found, or `Err(e)` when
    /// `source` is not a node of the graph.
    fn detect(&self, graph: &GraphCSR, source: usize) -> Result<Detection, Error>;
}
