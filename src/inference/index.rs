//! Per-document view of a pair list.
//!
//! Rows that denote the same relationship (same document, same two events,
//! either orientation) are grouped under one *anchor* row, the first one in
//! table order. Triples of events whose three pairs are all present are
//! enumerated document by document.

use crate::{Error, Pair, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A row that repeats the relationship of an earlier anchor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Duplicate {
    pub anchor: usize,
    pub row: usize,
    /// Whether both rows list the events in the same order.
    pub same_orientation: bool,
}

/// Events and pairs of one document.
#[derive(Debug, Default)]
pub(crate) struct DocGraph {
    pub doc_id: String,
    ids: HashMap<String, usize>,
    // (smaller event index, larger event index) -> (anchor row, anchor runs small -> large)
    edges: BTreeMap<(usize, usize), (usize, bool)>,
    adjacency: Vec<BTreeSet<usize>>,
}

impl DocGraph {
    fn intern(&mut self, event: &str) -> usize {
        if let Some(&i) = self.ids.get(event) {
            return i;
        }
        let i = self.adjacency.len();
        self.ids.insert(event.to_string(), i);
        self.adjacency.push(BTreeSet::new());
        i
    }

    /// Index of an event.
    pub fn event(&self, event: &str) -> Option<usize> {
        self.ids.get(event).copied()
    }

    /// Anchor row of the relationship `i -> j`, and whether the anchor runs `i -> j`.
    pub fn oriented(&self, i: usize, j: usize) -> Option<(usize, bool)> {
        let (key, forward) = if i < j { ((i, j), true) } else { ((j, i), false) };
        self.edges
            .get(&key)
            .map(|&(row, small_to_large)| (row, small_to_large == forward))
    }

    /// Every `(i, j, k)` with `i < j < k` whose three pairs are present.
    pub fn triples(&self) -> Vec<[usize; 3]> {
        let mut out = Vec::new();
        for &(i, j) in self.edges.keys() {
            for &k in self.adjacency[j].range(j + 1..) {
                if self.adjacency[i].contains(&k) {
                    out.push([i, j, k]);
                }
            }
        }
        out
    }

    /// Anchor rows in event-index order.
    pub fn anchor_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.values().map(|&(row, _)| row)
    }
}

/// Pair list grouped by document.
#[derive(Debug, Default)]
pub(crate) struct PairIndex {
    docs: BTreeMap<String, DocGraph>,
    duplicates: Vec<Duplicate>,
}

impl PairIndex {
    pub fn new(pairs: &[Pair]) -> Result<Self> {
        let mut index = PairIndex::default();
        for (row, pair) in pairs.iter().enumerate() {
            if pair.left == pair.right {
                return Err(Error::invalid_input(format!(
                    "row {row} relates event {} to itself in document {}",
                    pair.left, pair.doc_id
                )));
            }
            let doc = index
                .docs
                .entry(pair.doc_id.clone())
                .or_insert_with(|| DocGraph {
                    doc_id: pair.doc_id.clone(),
                    ..DocGraph::default()
                });
            let l = doc.intern(&pair.left);
            let r = doc.intern(&pair.right);
            let key = (l.min(r), l.max(r));
            let small_to_large = l < r;
            match doc.edges.get(&key) {
                Some(&(anchor, anchor_dir)) => index.duplicates.push(Duplicate {
                    anchor,
                    row,
                    same_orientation: anchor_dir == small_to_large,
                }),
                None => {
                    doc.edges.insert(key, (row, small_to_large));
                    doc.adjacency[l].insert(r);
                    doc.adjacency[r].insert(l);
                }
            }
        }
        Ok(index)
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = &DocGraph> {
        self.docs.values()
    }

    /// Rows repeating an earlier relationship.
    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    /// Anchor row for `a -> b` in `doc_id`, with its orientation relative to `a -> b`.
    pub fn lookup(&self, doc_id: &str, a: &str, b: &str) -> Option<(usize, bool)> {
        let doc = self.docs.get(doc_id)?;
        doc.oriented(doc.event(a)?, doc.event(b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_and_orientation() {
        let pairs = vec![
            Pair::new("d", "e1", "e2"),
            Pair::new("d", "e2", "e3"),
            Pair::new("d", "e2", "e1").with_reversed(true),
            Pair::new("d", "e1", "e2"),
        ];
        let index = PairIndex::new(&pairs).unwrap();
        assert_eq!(
            index.duplicates(),
            &[
                Duplicate {
                    anchor: 0,
                    row: 2,
                    same_orientation: false
                },
                Duplicate {
                    anchor: 0,
                    row: 3,
                    same_orientation: true
                },
            ]
        );
        assert_eq!(index.lookup("d", "e1", "e2"), Some((0, true)));
        assert_eq!(index.lookup("d", "e2", "e1"), Some((0, false)));
        assert_eq!(index.lookup("d", "e3", "e2"), Some((1, false)));
        assert_eq!(index.lookup("d", "e1", "e3"), None);
        assert_eq!(index.lookup("other", "e1", "e2"), None);
    }

    #[test]
    fn test_triples_are_document_local() {
        let pairs = vec![
            Pair::new("d1", "a", "b"),
            Pair::new("d1", "b", "c"),
            Pair::new("d1", "c", "a"),
            Pair::new("d1", "c", "d"),
            Pair::new("d2", "a", "b"),
            Pair::new("d2", "b", "c"),
        ];
        let index = PairIndex::new(&pairs).unwrap();
        let counts: Vec<(String, usize)> = index
            .documents()
            .map(|d| (d.doc_id.clone(), d.triples().len()))
            .collect();
        assert_eq!(counts, vec![("d1".to_string(), 1), ("d2".to_string(), 0)]);
    }

    #[test]
    fn test_self_pair_rejected() {
        assert!(PairIndex::new(&[Pair::new("d", "e1", "e1")]).is_err());
    }
}
