use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A bidirectional incidence index: a multimap and its inverse kept in
/// lockstep behind one interface.
///
/// Every edge `(l, r)` is recorded on both sides or on neither, so the
/// mutual-inverse invariant between a forward index and its reverse holds by
/// construction rather than by discipline. Three instances of this type form
/// the engine's tripartite graph: formulas↔ranges, ranges↔component cells,
/// and formulas↔direct input cells.
///
/// Lookups on unknown keys yield empty iterators, never errors: a key with no
/// bucket and a key with an empty bucket are indistinguishable to readers,
/// which is exactly the contract construction relies on.
#[derive(Clone, Debug, Default)]
pub struct Incidence<L, R> {
    forward: HashMap<L, HashSet<R>>,
    inverse: HashMap<R, HashSet<L>>,
}

impl<L, R> Incidence<L, R>
where
    L: Copy + Eq + Hash,
    R: Copy + Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            inverse: HashMap::new(),
        }
    }

    /// Add the edge `(l, r)` to both sides. Idempotent; returns whether the
    /// edge was new.
    pub fn insert(&mut self, l: L, r: R) -> bool {
        let new = self.forward.entry(l).or_default().insert(r);
        if new {
            self.inverse.entry(r).or_default().insert(l);
        }
        new
    }

    /// Initialize an empty forward bucket for `l` if none exists.
    ///
    /// Registration uses this so that every formula has a (possibly empty)
    /// entry from the moment it exists, before any edge is linked.
    pub fn ensure_left(&mut self, l: L) {
        self.forward.entry(l).or_default();
    }

    #[must_use]
    pub fn contains(&self, l: &L, r: &R) -> bool {
        self.forward.get(l).is_some_and(|set| set.contains(r))
    }

    /// All right-hand neighbors of `l`. Empty for unknown keys.
    pub fn forward(&self, l: &L) -> impl Iterator<Item = R> + '_ {
        self.forward.get(l).into_iter().flatten().copied()
    }

    /// All left-hand neighbors of `r`. Empty for unknown keys.
    pub fn inverse(&self, r: &R) -> impl Iterator<Item = L> + '_ {
        self.inverse.get(r).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn forward_len(&self, l: &L) -> usize {
        self.forward.get(l).map_or(0, HashSet::len)
    }

    #[must_use]
    pub fn inverse_len(&self, r: &R) -> usize {
        self.inverse.get(r).map_or(0, HashSet::len)
    }

    /// Left keys with a bucket, including empty ones created by
    /// [`ensure_left`](Self::ensure_left).
    pub fn lefts(&self) -> impl Iterator<Item = L> + '_ {
        self.forward.keys().copied()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(HashSet::len).sum()
    }

    /// True when forward and inverse record exactly the same edge set.
    ///
    /// Always true for this implementation; exposed so tests can assert the
    /// invariant explicitly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let forward_edges = self.edge_count();
        let inverse_edges: usize = self.inverse.values().map(HashSet::len).sum();
        forward_edges == inverse_edges
            && self
                .forward
                .iter()
                .all(|(l, rs)| rs.iter().all(|r| self.inverse[r].contains(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_records_both_sides() {
        let mut idx: Incidence<u32, char> = Incidence::new();
        assert!(idx.insert(1, 'a'));
        assert!(idx.insert(1, 'b'));
        assert!(idx.insert(2, 'a'));

        assert!(idx.contains(&1, &'a'));
        assert_eq!(idx.forward_len(&1), 2);
        assert_eq!(idx.inverse_len(&'a'), 2);
        let mut readers: Vec<u32> = idx.inverse(&'a').collect();
        readers.sort_unstable();
        assert_eq!(readers, vec![1, 2]);
        assert!(idx.is_consistent());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut idx: Incidence<u32, char> = Incidence::new();
        assert!(idx.insert(1, 'a'));
        assert!(!idx.insert(1, 'a'));
        assert_eq!(idx.edge_count(), 1);
        assert_eq!(idx.inverse_len(&'a'), 1);
    }

    #[test]
    fn unknown_keys_read_as_empty() {
        let idx: Incidence<u32, char> = Incidence::new();
        assert_eq!(idx.forward(&9).count(), 0);
        assert_eq!(idx.inverse(&'z').count(), 0);
        assert_eq!(idx.forward_len(&9), 0);
    }

    #[test]
    fn ensure_left_creates_an_empty_bucket() {
        let mut idx: Incidence<u32, char> = Incidence::new();
        idx.ensure_left(7);
        assert_eq!(idx.lefts().collect::<Vec<_>>(), vec![7]);
        assert_eq!(idx.forward_len(&7), 0);
        assert_eq!(idx.edge_count(), 0);
        assert!(idx.is_consistent());
    }
}
