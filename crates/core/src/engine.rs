use serde::Deserialize;
use std::fmt::{self, Display};
use std::hash::Hash;
use tracing::{debug, error, info};

use super::csr::GraphCSR;
use super::graph_builder::{AssetGraph, GraphBuilder};
use super::reconstructor::CycleReconstructor;
use super::snapshot::PriceSnapshot;
use super::solver::{BellmanFordSolver, SourceStrategy};
use super::traits::CycleDetector;
use common::{
    error::Error,
    numeric_kernel::{self, DEFAULT_EPSILON},
    types::WeightedCycle,
};

/// Tunables for [`ArbitrageEngine::new`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub epsilon: f64,
    pub strategy: SourceStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            strategy: SourceStrategy::default(),
        }
    }
}

/// A profitable loop over named assets.
///
/// `route` starts and ends at the same asset; `rates[i]` is the rate of the hop
/// `route[i] -> route[i + 1]`. Profit figures are gross: fees, slippage and gas
/// are not part of this computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity<A> {
    pub route: Vec<A>,
    pub rates: Vec<f64>,
    pub log_rate_sum: f64,
}

impl<A> Opportunity<A> {
    pub fn product_rate(&self) -> f64 {
        (-self.log_rate_sum).exp()
    }

    /// `exp(-Σw) - 1`, e.g. `0.004` for a 0.4% gross gain.
    pub fn profit_ratio(&self) -> f64 {
        numeric_kernel::profit_ratio(self.log_rate_sum)
    }

    pub fn hop_count(&self) -> usize {
        self.rates.len()
    }
}

impl<A: Display> Display for Opportunity<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, asset) in self.route.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", asset)?;
        }
        write!(f, " ({:+.4}%)", self.profit_ratio() * 100.0)
    }
}

/// Composition root: snapshot → graph → detection → reconstruction → route.
///
/// The engine keeps no state between calls; every call builds its own graph
/// and tables and drops them on return.
#[derive(Debug, Clone)]
pub struct ArbitrageEngine<D = BellmanFordSolver> {
    detector: D,
    reconstructor: CycleReconstructor,
}

impl ArbitrageEngine<BellmanFordSolver> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_detector(BellmanFordSolver::new(config.epsilon, config.strategy))
    }
}

impl Default for ArbitrageEngine<BellmanFordSolver> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<D> ArbitrageEngine<D>
where
    D: CycleDetector,
{
    pub fn with_detector(detector: D) -> Self {
        Self {
            detector,
            reconstructor: CycleReconstructor,
        }
    }

    /// Looks for a profitable loop in `snapshot`.
    ///
    /// # Returns
    /// - `Ok(Some(opportunity))` → a loop whose rate product exceeds 1.
    /// - `Ok(None)` → no opportunity in this snapshot.
    /// - `Err(Error::InvalidSource)` → `source` has no tradable quote in the snapshot.
    /// - `Err(Error::InternalInconsistency)` → detector and reconstructor disagree;
    ///   no route is returned.
    pub fn find_opportunity<A>(
        &self,
        snapshot: &PriceSnapshot<A>,
        source: &A,
    ) -> Result<Option<Opportunity<A>>, Error>
    where
        A: Clone + Eq + Hash + Display,
    {
        let graph = GraphBuilder::build(snapshot);
        self.find_in_graph(&graph, source)
    }

    /// Same as [`find_opportunity`](Self::find_opportunity) over an already built
    /// graph. A caller caching the graph must rebuild it for every new snapshot.
    pub fn find_in_graph<A>(
        &self,
        graph: &AssetGraph<A>,
        source: &A,
    ) -> Result<Option<Opportunity<A>>, Error>
    where
        A: Clone + Eq + Hash + Display,
    {
        let source_node = graph
            .node_of(source)
            .ok_or_else(|| Error::InvalidSource(source.to_string()))?;

        let detection = self.detector.detect(graph.csr(), source_node)?;

        let Some(witness) = detection.witness else {
            debug!(%source, nodes = graph.num_nodes(), "No arbitrage cycle found");
            return Ok(None);
        };

        let cycle = self
            .reconstructor
            .reconstruct(&detection.predecessors, witness)
            .and_then(|nodes| weigh_cycle(graph.csr(), rotate_to(nodes, source_node)))
            .inspect_err(|e| {
                error!(%source, witness, error = %e, "Discarding detected cycle");
            })?;

        let route = cycle
            .nodes
            .iter()
            .map(|&node| {
                graph
                    .asset(node)
                    .cloned()
                    .ok_or(Error::NodeIndexOutOfBounds(node))
            })
            .collect::<Result<Vec<A>, Error>>()?;

        let opportunity = Opportunity {
            route,
            rates: cycle.rates,
            log_rate_sum: cycle.log_rate_sum,
        };

        info!(
            route = %opportunity,
            hops = opportunity.hop_count(),
            profit_ratio = opportunity.profit_ratio(),
            "Arbitrage opportunity detected"
        );

        Ok(Some(opportunity))
    }
}

/// Restarts a closed cycle at `node` when `node` is on it.
fn rotate_to(mut cycle: Vec<usize>, node: usize) -> Vec<usize> {
    if cycle.len() < 2 {
        return cycle;
    }
    cycle.pop();
    if let Some(pos) = cycle.iter().position(|&n| n == node) {
        cycle.rotate_left(pos);
    }
    cycle.push(cycle[0]);
    cycle
}

/// Looks up every hop in the graph and checks the loop is closed and profitable.
fn weigh_cycle(graph: &GraphCSR, nodes: Vec<usize>) -> Result<WeightedCycle, Error> {
    let mut rates = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut log_rate_sum = 0.0f64;

    for hop in nodes.windows(2) {
        let weight = graph.edge_weight(hop[0], hop[1]).ok_or_else(|| {
            Error::InternalInconsistency(format!(
                "cycle hop {} -> {} is not an edge of the graph",
                hop[0], hop[1]
            ))
        })?;
        rates.push(numeric_kernel::weight_to_rate(weight));
        log_rate_sum += weight;
    }

    let cycle = WeightedCycle {
        nodes,
        rates,
        log_rate_sum,
    };

    if !cycle.is_closed() {
        return Err(Error::InternalInconsistency(format!(
            "reconstructed route {:?} is not a closed loop",
            cycle.nodes
        )));
    }
    if !cycle.is_profitable() {
        return Err(Error::InternalInconsistency(format!(
            "reconstructed loop {:?} has non-negative weight sum {}",
            cycle.nodes, cycle.log_rate_sum
        )));
    }

    Ok(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Detection;

    fn snapshot(quotes: &[(&'static str, &'static str, f64)]) -> PriceSnapshot<&'static str> {
        quotes.iter().copied().collect()
    }

    #[test]
    fn rotate_to_restarts_at_source() {
        assert_eq!(rotate_to(vec![2, 0, 1, 2], 0), vec![0, 1, 2, 0]);
        assert_eq!(rotate_to(vec![2, 0, 1, 2], 2), vec![2, 0, 1, 2]);
    }

    #[test]
    fn rotate_to_leaves_foreign_cycle_alone() {
        assert_eq!(rotate_to(vec![3, 4, 3], 0), vec![3, 4, 3]);
    }

    #[test]
    fn weigh_cycle_rejects_missing_hop() {
        let graph = GraphCSR::from_edges(3, &mut [(0, 1, 2.0), (1, 0, 2.0)]);

        let result = weigh_cycle(&graph, vec![0, 2, 0]);

        assert!(matches!(result, Err(Error::InternalInconsistency(_))));
    }

    #[test]
    fn weigh_cycle_rejects_losing_loop() {
        let graph = GraphCSR::from_edges(2, &mut [(0, 1, 0.5), (1, 0, 1.5)]);

        let result = weigh_cycle(&graph, vec![0, 1, 0]);

        assert!(matches!(result, Err(Error::InternalInconsistency(_))));
    }

    #[test]
    fn weigh_cycle_collects_rates() {
        let graph = GraphCSR::from_edges(2, &mut [(0, 1, 0.5), (1, 0, 2.5)]);

        let cycle = weigh_cycle(&graph, vec![0, 1, 0]).unwrap();

        assert_eq!(cycle.hop_count(), 2);
        assert!((cycle.rates[0] - 0.5).abs() < 1e-12);
        assert!((cycle.rates[1] - 2.5).abs() < 1e-12);
        assert!((cycle.product_rate() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn finds_two_asset_loop_starting_at_source() {
        let engine = ArbitrageEngine::new(EngineConfig::default());
        let rates = snapshot(&[("A", "B", 2.0), ("B", "A", 0.55)]);

        let opportunity = engine.find_opportunity(&rates, &"B").unwrap().unwrap();

        assert_eq!(opportunity.route, vec!["B", "A", "B"]);
        assert!((opportunity.profit_ratio() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let engine = ArbitrageEngine::new(EngineConfig::default());
        let rates = snapshot(&[("A", "B", 2.0), ("B", "A", 0.55)]);

        let result = engine.find_opportunity(&rates, &"C");

        assert_eq!(result, Err(Error::InvalidSource("C".to_string())));
    }

    #[test]
    fn opportunity_display() {
        let opportunity = Opportunity {
            route: vec!["A", "B", "A"],
            rates: vec![2.0, 0.55],
            log_rate_sum: -(1.1f64.ln()),
        };

        assert_eq!(opportunity.to_string(), "A -> B -> A (+10.0000%)");
    }

    /// A detector that reports a witness whose predecessor chain never closes.
    struct BrokenDetector;

    impl CycleDetector for BrokenDetector {
        fn detect(&self, graph: &GraphCSR, _source: usize) -> Result<Detection, Error> {
            let n = graph.num_nodes;
            Ok(Detection {
                distances: vec![0.0; n],
                predecessors: vec![None; n],
                witness: Some(0),
            })
        }
    }

    #[test]
    fn inconsistent_detection_is_surfaced() {
        let engine = ArbitrageEngine::with_detector(BrokenDetector);
        let rates = snapshot(&[("A", "B", 2.0), ("B", "A", 0.55)]);

        let result = engine.find_opportunity(&rates, &"A");

        assert!(matches!(result, Err(Error::InternalInconsistency(_))));
    }
}
