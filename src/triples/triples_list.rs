use super::{Order, TripleId};

/// Mutable staging area for a triple set between ID-remapping and final encoding.
/// Never serialized directly; sorted, deduplicated and handed to [`super::TriplesBitmap::from_triples`]
/// or [`super::PlainTriples::from_triples_list`].
#[derive(Debug, Default, Clone)]
pub struct TriplesList {
    triples: Vec<TripleId>,
}

/// Projects a triple onto the component order used for sorting/comparison.
const fn project(order: &Order, [s, p, o]: TripleId) -> TripleId {
    match order {
        Order::SPO | Order::Unknown => [s, p, o],
        Order::SOP => [s, o, p],
        Order::PSO => [p, s, o],
        Order::POS => [p, o, s],
        Order::OSP => [o, s, p],
        Order::OPS => [o, p, s],
    }
}

impl TriplesList {
    /// An empty triples list.
    pub const fn new() -> Self {
        TriplesList { triples: Vec::new() }
    }

    /// Appends a triple.
    pub fn insert(&mut self, tid: TripleId) {
        self.triples.push(tid);
    }

    /// Number of stored triples, duplicates included.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the list holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Stably sorts the stored triples by the given component order.
    pub fn sort(&mut self, order: &Order) {
        self.triples.sort_by_key(|&t| project(order, t));
    }

    /// Collapses consecutive equal triples. Call after [`Self::sort`].
    pub fn remove_duplicates(&mut self) {
        self.triples.dedup();
    }

    /// Sequential scan for triples matching a pattern, where a `0` component is a wildcard.
    pub fn search(&self, pattern: TripleId) -> impl Iterator<Item = TripleId> + '_ {
        self.triples.iter().copied().filter(move |&[s, p, o]| {
            (pattern[0] == 0 || pattern[0] == s)
                && (pattern[1] == 0 || pattern[1] == p)
                && (pattern[2] == 0 || pattern[2] == o)
        })
    }

    /// Consumes the list, returning its triples in their current order.
    pub fn into_vec(self) -> Vec<TripleId> {
        self.triples
    }

    /// The stored triples in their current order.
    pub fn as_slice(&self) -> &[TripleId] {
        &self.triples
    }
}

impl FromIterator<TripleId> for TriplesList {
    fn from_iter<I: IntoIterator<Item = TripleId>>(iter: I) -> Self {
        TriplesList { triples: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_and_dedup_spo() {
        let mut list: TriplesList = [[2, 1, 1], [1, 2, 1], [1, 1, 1], [1, 1, 1]].into_iter().collect();
        list.sort(&Order::SPO);
        list.remove_duplicates();
        assert_eq!(list.into_vec(), vec![[1, 1, 1], [1, 2, 1], [2, 1, 1]]);
    }

    #[test]
    fn search_matches_pattern_with_wildcards() {
        let list: TriplesList = [[1, 1, 1], [1, 2, 1], [2, 1, 1]].into_iter().collect();
        let hits: Vec<_> = list.search([1, 0, 0]).collect();
        assert_eq!(hits, vec![[1, 1, 1], [1, 2, 1]]);
    }
}
