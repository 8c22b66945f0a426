use crate::numeric_kernel;

/// A closed cycle over node indices, as traced by the reconstructor.
///
/// Fields:
/// - `nodes`: node indices in trade order; the first node is repeated at the end.
/// - `rates`: the exchange rate of each hop (`nodes.len() - 1` entries).
/// - `log_rate_sum`: sum of transformed weights `-ln(rate)`; negative for a profitable loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCycle {
    pub nodes: Vec<usize>,
    pub rates: Vec<f64>,
    pub log_rate_sum: f64,
}

impl WeightedCycle {
    /// Returns the actual profit multiplier (∏ rate_i) for the cycle.
    ///
    /// Internally, the cycle stores the transformed sum: ∑ w_i where w_i = -ln(rate_i).
    /// The product is recovered via the inverse operation: rate_product = e^(-sum(w_i)).
    ///
    /// Example:
    /// ```text
    /// If original rates are [2.0, 3.0, 4.0] (∏=24.0),
    /// stored sum (log_rate_sum) = -ln(24.0) ≈ -3.178.
    /// product_rate = exp(-(-3.178)) = 24.0
    /// ```
    pub fn product_rate(&self) -> f64 {
        (-self.log_rate_sum).exp()
    }

    /// Gross gain of one trip around the loop, e.g. `0.004` for 0.4%.
    pub fn profit_ratio(&self) -> f64 {
        numeric_kernel::profit_ratio(self.log_rate_sum)
    }

    /// Returns true if the cycle is profitable (product_rate > 1.0).
    pub fn is_profitable(&self) -> bool {
        self.log_rate_sum < 0.0
    }

    pub fn hop_count(&self) -> usize {
        self.rates.len()
    }

    /// True when the node sequence is a closed loop with at least two distinct nodes.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() >= 3 && self.nodes.first() == self.nodes.last()
    }
}

/// Type alias for a single edge list: (from, to, rate)
pub type Edge = (usize, usize, f64);
