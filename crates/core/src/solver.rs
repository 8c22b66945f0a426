use serde::Deserialize;
use std::f64;
use tracing::trace;

use super::csr::GraphCSR;
use super::traits::CycleDetector;
use common::{error::Error, numeric_kernel};

/// How the initial distance table is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    /// Textbook single-source Bellman-Ford: only cycles reachable from the
    /// source can be found.
    SingleSource,

    /// Every node starts at distance 0.0, which simulates a virtual source with
    /// a zero-weight edge to every node. Any negative cycle in the graph is
    /// detectable regardless of which component it lives in.
    #[default]
    SuperSource,
}

/// Outcome of one relaxation run.
///
/// `witness` is a node whose distance could still be lowered after all
/// relaxation passes, which proves a negative cycle feeds into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub distances: Vec<f64>,
    pub predecessors: Vec<Option<usize>>,
    pub witness: Option<usize>,
}

/// Bellman-Ford negative cycle detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BellmanFordSolver {
    pub epsilon: f64,
    pub strategy: SourceStrategy,
}

impl Default for BellmanFordSolver {
    fn default() -> Self {
        Self {
            epsilon: numeric_kernel::DEFAULT_EPSILON,
            strategy: SourceStrategy::default(),
        }
    }
}

impl BellmanFordSolver {
    pub fn new(epsilon: f64, strategy: SourceStrategy) -> Self {
        Self { epsilon, strategy }
    }

    fn initial_distances(&self, num_nodes: usize, source: usize) -> Vec<f64> {
        match self.strategy {
            SourceStrategy::SingleSource => {
                let mut distance = vec![f64::INFINITY; num_nodes];
                distance[source] = 0.0;
                distance
            }
            SourceStrategy::SuperSource => vec![0.0; num_nodes],
        }
    }
}

impl CycleDetector for BellmanFordSolver {
    /// Runs `|V| - 1` relaxation passes followed by one detection scan.
    ///
    /// Edges are visited in CSR index order on every pass, so the result is a
    /// pure function of the graph, the source and the solver settings.
    ///
    /// # Returns
    /// - `Ok(detection)` with `witness: Some(v)` → a negative cycle leads into `v`.
    /// - `Ok(detection)` with `witness: None` → no negative cycle was found.
    /// - `Err(Error::NodeIndexOutOfBounds)` → `source` is not a node.
    fn detect(&self, graph: &GraphCSR, source: usize) -> Result<Detection, Error> {
        if source >= graph.num_nodes {
            return Err(Error::NodeIndexOutOfBounds(source));
        }

        let num_nodes = graph.num_nodes;
        let mut distance = self.initial_distances(num_nodes, source);
        let mut predecessor: Vec<Option<usize>> = vec![None; num_nodes];

        for pass in 1..num_nodes {
            let mut relaxed = 0usize;

            for (u, v, weight) in graph.edges() {
                if !distance[u].is_finite() {
                    continue;
                }
                let candidate = distance[u] + weight;
                if numeric_kernel::improves(distance[v], candidate, self.epsilon) {
                    distance[v] = candidate;
                    predecessor[v] = Some(u);
                    relaxed += 1;
                }
            }

            trace!(pass, relaxed, "Relaxation pass complete");

            // A quiet pass means every later pass would be quiet too.
            if relaxed == 0 {
                return Ok(Detection {
                    distances: distance,
                    predecessors: predecessor,
                    witness: None,
                });
            }
        }

        let mut witness = None;
        for (u, v, weight) in graph.edges() {
            if !distance[u].is_finite() {
                continue;
            }
            if numeric_kernel::improves(distance[v], distance[u] + weight, self.epsilon) {
                // The |V|-th relaxation: pointing v at u guarantees that walking
                // predecessors back from v ends up inside the cycle.
                predecessor[v] = Some(u);
                witness = Some(v);
                break;
            }
        }

        Ok(Detection {
            distances: distance,
            predecessors: predecessor,
            witness,
        })
    }
}
