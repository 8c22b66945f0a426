use std::collections::HashMap;
use std::hash::Hash;

/// A point-in-time set of exchange-rate quotes, keyed by ordered asset pair.
///
/// Quotes are kept in insertion order. That order drives node numbering and
/// edge relaxation order downstream, so two identical snapshots always produce
/// identical results. Inserting a pair that is already present replaces its
/// rate without moving it.
#[derive(Debug, Clone)]
pub struct PriceSnapshot<A> {
    quotes: Vec<(A, A, f64)>,
    positions: HashMap<(A, A), usize>,
}

impl<A> Default for PriceSnapshot<A> {
    fn default() -> Self {
        Self {
            quotes: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<A> PriceSnapshot<A>
where
    A: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from the nested form `from -> (to -> rate)`.
    pub fn from_nested<I, J>(rates: I) -> Self
    where
        I: IntoIterator<Item = (A, J)>,
        J: IntoIterator<Item = (A, f64)>,
    {
        let mut snapshot = Self::new();
        for (from, quotes) in rates {
            for (to, rate) in quotes {
                snapshot.insert(from.clone(), to, rate);
            }
        }
        snapshot
    }

    /// Records how many units of `to` one unit of `from` buys.
    ///
    /// The rate is stored as given; invalid rates are filtered when the graph
    /// is built, not here.
    pub fn insert(&mut self, from: A, to: A, rate: f64) {
        let key = (from, to);
        match self.positions.get(&key).copied() {
            Some(pos) => self.quotes[pos].2 = rate,
            None => {
                self.positions.insert(key.clone(), self.quotes.len());
                self.quotes.push((key.0, key.1, rate));
            }
        }
    }

    pub fn rate(&self, from: &A, to: &A) -> Option<f64> {
        self.positions
            .get(&(from.clone(), to.clone()))
            .map(|&pos| self.quotes[pos].2)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&A, &A, f64)> {
        self.quotes.iter().map(|(from, to, rate)| (from, to, *rate))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl<A> FromIterator<(A, A, f64)> for PriceSnapshot<A>
where
    A: Clone + Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (A, A, f64)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        snapshot.extend(iter);
        snapshot
    }
}

impl<A> Extend<(A, A, f64)> for PriceSnapshot<A>
where
    A: Clone + Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (A, A, f64)>>(&mut self, iter: T) {
        for (from, to, rate) in iter {
            self.insert(from, to, rate);
        }
    }
}
