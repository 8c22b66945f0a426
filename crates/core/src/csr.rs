use common::numeric_kernel::rate_to_weight;
use common::types::Edge;

/// Graph in Compressed Sparse Row (CSR) format for fast graph traversal.
///
/// CSR format stores outgoing edges of each node contiguously in memory:
/// - `node_pointers[u]..node_pointers[u+1]` → edges from node `u`
/// - `edge_targets[i]` -> target node of edge `i`
/// - `edge_weights[i]` -> weight `-ln(rate)` of edge `i`
/// - `edge_source_by_index[i]` -> source node of edge `i`
///
/// Edge index order is the relaxation order used by the solver, so it has to be
/// stable: edges are grouped by source node and, within a node, keep the order
/// in which they were supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphCSR {
    pub num_nodes: usize,
    pub node_pointers: Vec<usize>,
    pub edge_targets: Vec<usize>,
    pub edge_weights: Vec<f64>,
    pub edge_source_by_index: Vec<usize>,
}

impl GraphCSR {
    /// Creates a new CSR graph from a list of edges `(src, dst, rate)`.
    ///
    /// Each edge weight is transformed as `-ln(rate)`. Edges whose rate cannot be
    /// log-transformed (zero, negative or non-finite) and edges touching a node
    /// outside `0..num_nodes` are skipped.
    ///
    /// # Arguments
    /// - `num_nodes`: total number of nodes (graph indices: 0..num_nodes-1)
    /// - `edges`: slice of `(src, dst, rate)` tuples
    pub fn from_edges(num_nodes: usize, edges: &mut [Edge]) -> Self {
        // `sort_by_key` is stable, which preserves insertion order per source.
        edges.sort_by_key(|(src, _, _)| *src);

        let weighted: Vec<(usize, usize, f64)> = edges
            .iter()
            .filter(|&&(u, v, _)| u < num_nodes && v < num_nodes)
            .filter_map(|&(u, v, rate)| rate_to_weight(rate).map(|w| (u, v, w)))
            .collect();

        let (node_pointers, edge_targets, edge_weights, edge_source_by_index) =
            Self::build_csr_from_edges(num_nodes, &weighted);

        Self {
            num_nodes,
            node_pointers,
            edge_targets,
            edge_weights,
            edge_source_by_index,
        }
    }

    /// Internal helper to construct all necessary arrays for the CSR format.
    ///
    /// Uses the two-pass counting technique: count out-degrees, prefix-sum them
    /// into `node_pointers`, then scatter every edge into its node's block.
    /// `edges` carries weights that are already transformed.
    fn build_csr_from_edges(
        num_nodes: usize,
        edges: &[(usize, usize, f64)],
    ) -> (Vec<usize>, Vec<usize>, Vec<f64>, Vec<usize>) {
        let m = edges.len();
        let mut node_pointers = vec![0; num_nodes + 1];

        for &(u, _, _) in edges {
            node_pointers[u + 1] += 1;
        }

        for i in 1..=num_nodes {
            node_pointers[i] += node_pointers[i - 1];
        }

        let mut edge_targets = vec![0; m];
        let mut edge_weights = vec![0.0; m];
        let mut edge_source_by_index = vec![0; m];

        let mut cursor = node_pointers.clone();

        for &(u, v, weight) in edges {
            let pos = cursor[u]; // Get the next available position for node 'u'
            edge_weights[pos] = weight;
            edge_targets[pos] = v;
            edge_source_by_index[pos] = u;

            cursor[u] += 1;
        }

        (
            node_pointers,
            edge_targets,
            edge_weights,
            edge_source_by_index,
        )
    }

    pub fn num_edges(&self) -> usize {
        self.edge_targets.len()
    }

    /// Outgoing `(target, weight)` pairs of node `u`, in CSR order.
    pub fn out_edges(&self, u: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = if u < self.num_nodes {
            self.node_pointers[u]..self.node_pointers[u + 1]
        } else {
            0..0
        };

        range.map(move |i| (self.edge_targets[i], self.edge_weights[i]))
    }

    /// Every edge as `(source, target, weight)`, in relaxation order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.num_edges()).map(move |i| {
            (
                self.edge_source_by_index[i],
                self.edge_targets[i],
                self.edge_weights[i],
            )
        })
    }

    /// Weight of the edge `u -> v`, if present.
    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        self.out_edges(u)
            .find(|&(target, _)| target == v)
            .map(|(_, weight)| weight)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edge_weight(u, v).is_some()
    }
}
