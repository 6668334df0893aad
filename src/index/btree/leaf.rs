//! Leaf nodes - the entry-holding bottom level of the tree.
//!
//! A [`LeafNode`] keeps keys and values as parallel sequences in ascending
//! key order, plus `prev`/`next` ids linking it into the leaf chain. The
//! chain spans every leaf in the tree and is the only way range scans move
//! from one leaf to the next.
//!
//! # Split
//! ```text
//!  before (2D+1 entries, D = 2):   [a b c d e] <-> N
//!  after:                          [a b] <-> [c d e] <-> N
//!  separator for the parent:        c   (also stays first in the right leaf)
//! ```
//!
//! # Underflow
//! Two adjacent leaves under one parent either share their entries
//! (redistribute, parent separator rewritten) or collapse into the left
//! leaf (merge, parent loses a separator and the right leaf leaves the
//! chain).

use tracing::debug;

use crate::common::NodeId;
use crate::index::btree::arena::NodeArena;
use crate::index::btree::node::{KeyContainer, Node, Rebalance, Split};

#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    keys: KeyContainer<K>,
    /// `values[i]` belongs to `keys[i]`.
    values: Vec<V>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<K, V> LeafNode<K, V> {
    /// A leaf holding a single entry, unlinked.
    pub(crate) fn with_entry(key: K, value: V) -> Self {
        Self::from_entries(vec![key], vec![value])
    }

    /// A leaf from parallel, already sorted key and value sequences.
    pub(crate) fn from_entries(keys: Vec<K>, values: Vec<V>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            keys: KeyContainer::from_vec(keys),
            values,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub(crate) fn keys(&self) -> &KeyContainer<K> {
        &self.keys
    }

    #[inline]
    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn entry_at(&self, i: usize) -> (&K, &V) {
        (self.keys.key_at(i), &self.values[i])
    }

    /// Entries in ascending key order.
    pub(crate) fn entries(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.keys.as_slice().iter().zip(self.values.iter())
    }

    #[inline]
    pub(crate) fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    #[inline]
    pub(crate) fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn set_prev(&mut self, prev: Option<NodeId>) {
        self.prev = prev;
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn is_overflowed(&self, order: usize) -> bool {
        self.keys.is_overflowed(order)
    }

    #[inline]
    pub(crate) fn is_underflowed(&self, order: usize) -> bool {
        self.keys.is_underflowed(order)
    }

    pub(crate) fn remove_at(&mut self, i: usize) -> (K, V) {
        (self.keys.remove_key_at(i), self.values.remove(i))
    }

    /// Keep entries `[..at]`, returning the rest as a new unlinked leaf.
    fn split_off(&mut self, at: usize) -> Self {
        Self {
            keys: self.keys.split_off(at),
            values: self.values.split_off(at),
            prev: None,
            next: None,
        }
    }

    /// Remove the first `n` entries as a new unlinked leaf.
    fn drain_front(&mut self, n: usize) -> Self {
        Self {
            keys: self.keys.drain_front(n),
            values: self.values.drain(..n).collect(),
            prev: None,
            next: None,
        }
    }

    /// Move every entry of `other` to the end of this leaf.
    fn append(&mut self, other: &mut Self) {
        self.keys.append(&mut other.keys);
        self.values.append(&mut other.values);
    }

    /// Move every entry of `front` ahead of this leaf's entries.
    fn prepend(&mut self, mut front: Self) {
        self.keys.prepend(front.keys);
        front.values.append(&mut self.values);
        self.values = front.values;
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Binary search for an exact match.
    pub(crate) fn find_exact(&self, key: &K) -> Option<&V> {
        self.keys.search(key).ok().map(|i| &self.values[i])
    }

    pub(crate) fn find_exact_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.keys.search(key) {
            Ok(i) => Some(&mut self.values[i]),
            Err(_) => None,
        }
    }

    /// Insert `key`/`value` at its ascending position.
    ///
    /// An existing entry with an equal key has its value overwritten and the
    /// old value is returned; the key set is unchanged in that case.
    pub(crate) fn insert_sorted(&mut self, key: K, value: V) -> Option<V> {
        match self.keys.search(&key) {
            Ok(i) => Some(std::mem::replace(&mut self.values[i], value)),
            Err(i) => {
                // i is the first position whose key exceeds `key`
                self.keys.insert_key_at(i, key);
                self.values.insert(i, value);
                None
            }
        }
    }

    /// Remove the entry whose key compares equal to `key`.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let i = self.keys.search(key).ok()?;
        Some(self.remove_at(i).1)
    }
}

/// Split an overflowed leaf in place.
///
/// The first D entries stay in `leaf_id`; the remaining D+1 move to a new
/// leaf linked in right after it. The returned separator duplicates the new
/// leaf's first key.
pub(crate) fn split<K: Clone, V>(
    arena: &mut NodeArena<K, V>,
    leaf_id: NodeId,
    order: usize,
) -> Split<K> {
    let leaf = arena.leaf_mut(leaf_id);
    let mut right = leaf.split_off(order);
    let old_next = leaf.next();

    right.set_prev(Some(leaf_id));
    right.set_next(old_next);
    let separator = right.keys.key_at(0).clone();
    let right_len = right.len();

    let right_id = arena.alloc(Node::Leaf(right));
    arena.leaf_mut(leaf_id).set_next(Some(right_id));
    if let Some(next) = old_next {
        arena.leaf_mut(next).set_prev(Some(right_id));
    }

    debug!(
        left = %leaf_id,
        right = %right_id,
        left_len = order,
        right_len,
        "split leaf"
    );

    Split {
        separator,
        right: right_id,
    }
}

/// Restore the size bound of one of two adjacent leaves under `parent_id`.
///
/// `separator` is the position in the parent of the key that divides
/// `left_id` from `right_id` (so `right_id` is child `separator + 1`).
///
/// - Combined size >= 2D: entries move from the larger leaf to the smaller
///   until both hold at least D, and the parent separator becomes the new
///   first key of the right leaf.
/// - Otherwise: the right leaf's entries are appended to the left leaf, the
///   right leaf is spliced out of the chain and freed, and the caller must
///   drop the separator (and its right child reference) from the parent.
pub(crate) fn merge_or_redistribute<K: Clone, V>(
    arena: &mut NodeArena<K, V>,
    left_id: NodeId,
    right_id: NodeId,
    parent_id: NodeId,
    separator: usize,
    order: usize,
) -> Rebalance {
    let (left, right) = arena.leaf_pair_mut(left_id, right_id);

    if left.len() + right.len() >= 2 * order {
        if left.len() > right.len() {
            let moved = left.split_off(order);
            right.prepend(moved);
        } else {
            let moved = left_deficit(left.len(), order);
            let mut front = right.drain_front(moved);
            left.append(&mut front);
        }
        let new_separator = right.keys.key_at(0).clone();
        debug!(
            left = %left_id,
            right = %right_id,
            left_len = left.len(),
            right_len = right.len(),
            "redistributed leaves"
        );

        arena
            .index_mut(parent_id)
            .replace_separator(separator, new_separator);
        return Rebalance::Redistributed;
    }

    left.append(right);
    let after = right.next();
    left.set_next(after);
    if let Some(after) = after {
        arena.leaf_mut(after).set_prev(Some(left_id));
    }
    arena.release(right_id);

    debug!(left = %left_id, freed = %right_id, separator, "merged leaves");
    Rebalance::Merged { separator }
}

/// Entries the left node needs to reach D.
#[inline]
pub(crate) fn left_deficit(left_len: usize, order: usize) -> usize {
    order.saturating_sub(left_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::btree::internal::IndexNode;

    fn keys_of<V>(leaf: &LeafNode<char, V>) -> String {
        leaf.keys().as_slice().iter().collect()
    }

    #[test]
    fn test_insert_sorted_positions() {
        let mut leaf = LeafNode::with_entry('m', 1);
        leaf.insert_sorted('a', 2); // prepend
        leaf.insert_sorted('z', 3); // append
        leaf.insert_sorted('f', 4); // middle

        assert_eq!(keys_of(&leaf), "afmz");
        assert_eq!(leaf.values(), &[2, 4, 1, 3]);
    }

    #[test]
    fn test_insert_sorted_overwrites_duplicate() {
        let mut leaf = LeafNode::from_entries(vec!['a', 'b'], vec![1, 2]);
        assert_eq!(leaf.insert_sorted('b', 20), Some(2));
        assert_eq!(leaf.len(), 2);
        assert_eq!(leaf.find_exact(&'b'), Some(&20));
    }

    #[test]
    fn test_find_exact_and_remove_by_value_equality() {
        let mut leaf = LeafNode::from_entries(
            vec![String::from("ant"), String::from("bee")],
            vec![1, 2],
        );

        // A freshly built key compares equal even though it is a new instance
        let probe = String::from("bee");
        assert_eq!(leaf.find_exact(&probe), Some(&2));
        assert_eq!(leaf.remove(&probe), Some(2));
        assert_eq!(leaf.find_exact(&probe), None);
        assert_eq!(leaf.remove(&probe), None);
    }

    #[test]
    fn test_split_links_new_leaf_between_neighbors() {
        let mut arena = NodeArena::new();
        let left = arena.alloc(Node::Leaf(LeafNode::from_entries(
            vec!['a', 'b', 'c', 'd', 'e'],
            vec![0; 5],
        )));
        let after = arena.alloc(Node::Leaf(LeafNode::from_entries(vec!['x'], vec![0])));
        arena.leaf_mut(left).set_next(Some(after));
        arena.leaf_mut(after).set_prev(Some(left));

        let split = split(&mut arena, left, 2);

        assert_eq!(split.separator, 'c');
        assert_eq!(keys_of(arena.leaf(left)), "ab");
        assert_eq!(keys_of(arena.leaf(split.right)), "cde");
        assert_eq!(arena.leaf(left).next(), Some(split.right));
        assert_eq!(arena.leaf(split.right).prev(), Some(left));
        assert_eq!(arena.leaf(split.right).next(), Some(after));
        assert_eq!(arena.leaf(after).prev(), Some(split.right));
    }

    fn pair(
        left: &str,
        right: &str,
        separator: char,
    ) -> (NodeArena<char, ()>, NodeId, NodeId, NodeId) {
        let mut arena = NodeArena::new();
        let l: Vec<char> = left.chars().collect();
        let r: Vec<char> = right.chars().collect();
        let left_id = arena.alloc(Node::Leaf(LeafNode::from_entries(
            l.clone(),
            vec![(); l.len()],
        )));
        let right_id = arena.alloc(Node::Leaf(LeafNode::from_entries(
            r.clone(),
            vec![(); r.len()],
        )));
        arena.leaf_mut(left_id).set_next(Some(right_id));
        arena.leaf_mut(right_id).set_prev(Some(left_id));
        let parent = arena.alloc(Node::Index(IndexNode::new_root(
            separator, left_id, right_id,
        )));
        (arena, left_id, right_id, parent)
    }

    #[test]
    fn test_redistribute_from_right() {
        let (mut arena, l, r, p) = pair("bc", "defg", 'd');

        let outcome = merge_or_redistribute(&mut arena, l, r, p, 0, 3);

        assert_eq!(outcome, Rebalance::Redistributed);
        assert_eq!(keys_of(arena.leaf(l)), "bcd");
        assert_eq!(keys_of(arena.leaf(r)), "efg");
        assert_eq!(arena.index(p).keys().as_slice(), &['e']);
    }

    #[test]
    fn test_redistribute_from_left() {
        let (mut arena, l, r, p) = pair("abcde", "x", 'x');

        let outcome = merge_or_redistribute(&mut arena, l, r, p, 0, 2);

        assert_eq!(outcome, Rebalance::Redistributed);
        assert_eq!(keys_of(arena.leaf(l)), "ab");
        assert_eq!(keys_of(arena.leaf(r)), "cdex");
        assert_eq!(arena.index(p).keys().as_slice(), &['c']);
    }

    #[test]
    fn test_merge_splices_chain() {
        let (mut arena, l, r, p) = pair("cd", "efg", 'e');

        let outcome = merge_or_redistribute(&mut arena, l, r, p, 0, 3);

        assert_eq!(outcome, Rebalance::Merged { separator: 0 });
        assert_eq!(keys_of(arena.leaf(l)), "cdefg");
        assert_eq!(arena.leaf(l).next(), None);
        // right leaf and parent remain; the freed leaf is gone
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_merge_with_empty_right_leaf() {
        let (mut arena, l, r, p) = pair("a", "", 'b');

        let outcome = merge_or_redistribute(&mut arena, l, r, p, 0, 1);

        assert_eq!(outcome, Rebalance::Merged { separator: 0 });
        assert_eq!(keys_of(arena.leaf(l)), "a");
    }
}
