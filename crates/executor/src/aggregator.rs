use std::collections::HashMap;

use tracing::{debug, warn};

use super::types::VenueQuote;
use arb_solver_core::PriceSnapshot;
use common::numeric_kernel::rate_to_weight;

/// Merges quotes from several venues into a single price snapshot.
///
/// For every ordered pair the best (highest) valid rate across venues wins.
/// Pairs keep the order in which they were first quoted, so the merged
/// snapshot is reproducible for a given quote stream.
#[derive(Debug, Default)]
pub struct QuoteAggregator {
    pairs: Vec<(String, String)>,
    best: HashMap<(String, String), Option<(f64, String)>>,
}

impl QuoteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quote: VenueQuote) {
        let key = (quote.from, quote.to);

        if !self.best.contains_key(&key) {
            self.pairs.push(key.clone());
            self.best.insert(key.clone(), None);
        }

        if rate_to_weight(quote.rate).is_none() {
            warn!(
                venue = %quote.venue,
                from = %key.0,
                to = %key.1,
                rate = quote.rate,
                "Ignoring non-tradable quote"
            );
            return;
        }

        if let Some(slot) = self.best.get_mut(&key) {
            let improves = slot.as_ref().is_none_or(|(rate, _)| quote.rate > *rate);
            if improves {
                *slot = Some((quote.rate, quote.venue));
            }
        }
    }

    /// Number of distinct pairs quoted so far, valid or not.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Venue currently holding the best rate for `from -> to`.
    #[cfg(test)]
    pub fn best_venue(&self, from: &str, to: &str) -> Option<&str> {
        self.best
            .get(&(from.to_string(), to.to_string()))?
            .as_ref()
            .map(|(_, venue)| venue.as_str())
    }

    /// Consumes the aggregator and returns the merged snapshot.
    pub fn into_snapshot(self) -> PriceSnapshot<String> {
        let mut snapshot = PriceSnapshot::new();
        if self.is_empty() {
            return snapshot;
        }

        let mut best = self.best;

        for key in self.pairs {
            match best.remove(&key).flatten() {
                Some((rate, venue)) => {
                    debug!(from = %key.0, to = %key.1, rate, %venue, "Best quote selected");
                    snapshot.insert(key.0, key.1, rate);
                }
                None => {
                    warn!(
                        from = %key.0,
                        to = %key.1,
                        "No liquidity data found across all venues."
                    );
                }
            }
        }

        snapshot
    }
}

impl Extend<VenueQuote> for QuoteAggregator {
    fn extend<T: IntoIterator<Item = VenueQuote>>(&mut self, iter: T) {
        for quote in iter {
            self.push(quote);
        }
    }
}
