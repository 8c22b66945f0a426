use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use tracing::debug;

use super::csr::GraphCSR;
use super::snapshot::PriceSnapshot;
use common::numeric_kernel::rate_to_weight;
use common::types::Edge;

/// A rate graph over named assets.
///
/// Assets are interned to dense node indices in the order they first appear in
/// a kept quote; the adjacency itself lives in a [`GraphCSR`].
#[derive(Debug, Clone)]
pub struct AssetGraph<A> {
    assets: Vec<A>,
    index: HashMap<A, usize>,
    csr: GraphCSR,
}

impl<A> AssetGraph<A>
where
    A: Clone + Eq + Hash,
{
    pub fn node_of(&self, asset: &A) -> Option<usize> {
        self.index.get(asset).copied()
    }

    pub fn asset(&self, node: usize) -> Option<&A> {
        self.assets.get(node)
    }

    /// Assets in node-index order.
    pub fn assets(&self) -> &[A] {
        &self.assets
    }

    pub fn csr(&self) -> &GraphCSR {
        &self.csr
    }

    pub fn num_nodes(&self) -> usize {
        self.csr.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.csr.num_edges()
    }

    pub fn contains(&self, asset: &A) -> bool {
        self.index.contains_key(asset)
    }

    /// Weight `-ln(rate)` of the edge `from -> to`, if the graph has one.
    pub fn weight(&self, from: &A, to: &A) -> Option<f64> {
        let u = self.node_of(from)?;
        let v = self.node_of(to)?;
        self.csr.edge_weight(u, v)
    }

    pub fn has_edge(&self, from: &A, to: &A) -> bool {
        self.weight(from, to).is_some()
    }

    fn intern(&mut self, asset: &A) -> usize {
        if let Some(&node) = self.index.get(asset) {
            return node;
        }
        let node = self.assets.len();
        self.assets.push(asset.clone());
        self.index.insert(asset.clone(), node);
        node
    }
}

/// Turns a price snapshot into a graph ready for relaxation.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Builds one edge per valid quote with weight `-ln(rate)`.
    ///
    /// Quotes with a zero, negative or non-finite rate describe no tradable
    /// edge and are dropped, as are self-quotes (`from == to`). An asset that
    /// only appears in dropped quotes does not become a node.
    pub fn build<A>(snapshot: &PriceSnapshot<A>) -> AssetGraph<A>
    where
        A: Clone + Eq + Hash + Display,
    {
        let mut graph = AssetGraph {
            assets: Vec::new(),
            index: HashMap::new(),
            csr: GraphCSR::from_edges(0, &mut []),
        };

        let mut edges: Vec<Edge> = Vec::with_capacity(snapshot.len());
        let mut dropped = 0usize;

        for (from, to, rate) in snapshot.iter() {
            if rate_to_weight(rate).is_none() {
                debug!(%from, %to, rate, "Dropping quote with non-tradable rate");
                dropped += 1;
                continue;
            }
            if from == to {
                debug!(asset = %from, rate, "Dropping self-quote");
                dropped += 1;
                continue;
            }

            let u = graph.intern(from);
            let v = graph.intern(to);
            edges.push((u, v, rate));
        }

        graph.csr = GraphCSR::from_edges(graph.assets.len(), &mut edges);

        debug!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            dropped,
            "Rate graph built"
        );

        graph
    }
}
