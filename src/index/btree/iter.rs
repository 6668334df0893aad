//! Ordered iteration over the leaf chain.

use std::iter::FusedIterator;

use crate::common::NodeId;
use crate::index::btree::arena::NodeArena;

/// Ascending iterator over a tree's entries.
///
/// Starts at the leftmost leaf and follows `next` links; it never touches
/// an index node after construction.
///
/// Created by [`BPlusTree::iter`](crate::BPlusTree::iter).
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    arena: &'a NodeArena<K, V>,
    leaf: Option<NodeId>,
    position: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(arena: &'a NodeArena<K, V>, first_leaf: Option<NodeId>, len: usize) -> Self {
        Self {
            arena,
            leaf: first_leaf,
            position: 0,
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.arena.leaf(self.leaf?);
            if self.position < leaf.len() {
                let entry = leaf.entry_at(self.position);
                self.position += 1;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(entry);
            }
            self.leaf = leaf.next();
            self.position = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
