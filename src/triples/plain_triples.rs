use super::{Order, TripleId, TriplesList};
use crate::containers::Sequence;

/// Exact, unindexed triple store: three parallel integer streams holding the components
/// of every triple in a chosen storage order. Used for small graphs and the `triples.type
/// = Plain` config option; never builds a reverse index, so every lookup is a full scan.
#[derive(Debug)]
pub struct PlainTriples {
    order: Order,
    x: Sequence,
    y: Sequence,
    z: Sequence,
}

impl PlainTriples {
    /// Builds a `PlainTriples` from a sorted, deduplicated [`TriplesList`] in the given order.
    /// Each of the three streams is populated from its own independent pass over `list` --
    /// never by reusing one component's values for another.
    pub fn from_triples_list(mut list: TriplesList, order: Order) -> Self {
        list.sort(&order);
        let triples = list.into_vec();
        let x: Vec<usize> = triples.iter().map(|&[s, _, _]| s).collect();
        let y: Vec<usize> = triples.iter().map(|&[_, p, _]| p).collect();
        let z: Vec<usize> = triples.iter().map(|&[_, _, o]| o).collect();
        PlainTriples { order, x: Sequence::new(&x), y: Sequence::new(&y), z: Sequence::new(&z) }
    }

    /// Number of stored triples.
    pub fn len(&self) -> usize {
        self.x.entries
    }

    /// Whether no triples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, pos: usize) -> TripleId {
        let (a, b, c) = (self.x.get(pos), self.y.get(pos), self.z.get(pos));
        match self.order {
            Order::SPO | Order::Unknown => [a, b, c],
            Order::SOP => [a, c, b],
            Order::PSO => [b, a, c],
            Order::POS => [c, a, b],
            Order::OSP => [b, c, a],
            Order::OPS => [c, b, a],
        }
    }

    /// Iterates over triples matching the given pattern, `0` components acting as wildcards.
    /// Always exact: when all components are wildcards this just enumerates every stored
    /// position, otherwise the sequential iterator is wrapped with a post-filter.
    pub fn search(&self, pattern: TripleId) -> impl Iterator<Item = TripleId> + '_ {
        (0..self.len()).map(|pos| self.get(pos)).filter(move |&[s, p, o]| {
            (pattern[0] == 0 || pattern[0] == s)
                && (pattern[1] == 0 || pattern[1] == p)
                && (pattern[2] == 0 || pattern[2] == o)
        })
    }

    /// Size in bytes on the heap.
    pub fn size_in_bytes(&self) -> usize {
        self.x.size_in_bytes() + self.y.size_in_bytes() + self.z.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(triples: &[TripleId]) -> TriplesList {
        triples.iter().copied().collect()
    }

    #[test]
    fn search_all_wildcards_returns_everything_in_order() {
        let pt = PlainTriples::from_triples_list(list(&[[2, 1, 1], [1, 1, 1], [1, 2, 1]]), Order::SPO);
        assert_eq!(pt.search([0, 0, 0]).collect::<Vec<_>>(), vec![[1, 1, 1], [1, 2, 1], [2, 1, 1]]);
    }

    #[test]
    fn search_filters_by_pattern() {
        let pt = PlainTriples::from_triples_list(list(&[[1, 1, 1], [1, 2, 1], [2, 1, 1]]), Order::SPO);
        assert_eq!(pt.search([1, 0, 0]).collect::<Vec<_>>(), vec![[1, 1, 1], [1, 2, 1]]);
        assert_eq!(pt.search([0, 0, 1]).count(), 3);
    }

    #[test]
    fn streams_are_independent_not_a_single_reused_iterator() {
        let pt = PlainTriples::from_triples_list(list(&[[1, 2, 3], [2, 3, 1]]), Order::SPO);
        assert_eq!(pt.get(0), [1, 2, 3]);
        assert_eq!(pt.get(1), [2, 3, 1]);
    }
}
