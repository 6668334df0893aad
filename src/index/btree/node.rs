//! Shared node representation.
//!
//! Both node kinds keep their keys in a [`KeyContainer`]: a plain ascending
//! sequence with over/underflow predicates relative to the order D. The
//! container never re-sorts; callers place keys where they belong.
//!
//! A node is a tagged [`Node`] variant rather than a trait object so every
//! split/merge path has to `match` on both kinds explicitly.

use crate::common::NodeId;
use crate::index::btree::internal::IndexNode;
use crate::index::btree::leaf::LeafNode;

/// Sorted key storage shared by leaf and index nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyContainer<K> {
    keys: Vec<K>,
}

impl<K> KeyContainer<K> {
    pub(crate) fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub(crate) fn from_vec(keys: Vec<K>) -> Self {
        Self { keys }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub(crate) fn key_at(&self, i: usize) -> &K {
        &self.keys[i]
    }

    pub(crate) fn as_slice(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn insert_key_at(&mut self, i: usize, key: K) {
        self.keys.insert(i, key);
    }

    pub(crate) fn remove_key_at(&mut self, i: usize) -> K {
        self.keys.remove(i)
    }

    /// Overwrite the key at `i`, returning the old one.
    pub(crate) fn replace_key_at(&mut self, i: usize, key: K) -> K {
        std::mem::replace(&mut self.keys[i], key)
    }

    pub(crate) fn push_key(&mut self, key: K) {
        self.keys.push(key);
    }

    pub(crate) fn pop_key(&mut self) -> Option<K> {
        self.keys.pop()
    }

    /// Split off keys `[at..]` into a new container.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        Self {
            keys: self.keys.split_off(at),
        }
    }

    /// Remove the first `n` keys into a new container.
    pub(crate) fn drain_front(&mut self, n: usize) -> Self {
        Self {
            keys: self.keys.drain(..n).collect(),
        }
    }

    /// Move every key of `other` to the end of this container.
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.keys.append(&mut other.keys);
    }

    /// Move every key of `front` ahead of the keys already here.
    pub(crate) fn prepend(&mut self, mut front: Self) {
        front.keys.append(&mut self.keys);
        self.keys = front.keys;
    }

    /// More than 2D keys: the node must split.
    #[inline]
    pub(crate) fn is_overflowed(&self, order: usize) -> bool {
        self.keys.len() > 2 * order
    }

    /// Fewer than D keys: a non-root node must merge or redistribute.
    #[inline]
    pub(crate) fn is_underflowed(&self, order: usize) -> bool {
        self.keys.len() < order
    }
}

impl<K: Ord> KeyContainer<K> {
    /// Binary search for `key`: `Ok(i)` on a match, `Err(i)` with the
    /// insertion point otherwise.
    pub(crate) fn search(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Number of keys less than or equal to `key`.
    pub(crate) fn upper_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }
}

impl<K> Default for KeyContainer<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// A tree node: either a leaf holding entries or an index node holding
/// separators and child references.
#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Index(IndexNode<K>),
}

impl<K, V> Node<K, V> {
    pub(crate) fn keys(&self) -> &KeyContainer<K> {
        match self {
            Node::Leaf(leaf) => leaf.keys(),
            Node::Index(index) => index.keys(),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

/// The product of a node split, handed to the parent.
///
/// For a leaf split `separator` is a copy of the right node's first key;
/// for an index split it is the middle key, which now lives only in the
/// parent.
#[derive(Debug)]
pub(crate) struct Split<K> {
    pub(crate) separator: K,
    pub(crate) right: NodeId,
}

/// Result of inserting below some node.
#[derive(Debug)]
pub(crate) enum Insertion<K, V> {
    /// The key existed; its value was overwritten.
    Replaced(V),
    /// A new entry fit without splitting at this level.
    Inserted,
    /// The node split; the parent must adopt `Split::right`.
    Split(Split<K>),
}

/// Result of deleting below some node, as seen by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rebalance {
    /// The child still holds enough keys (or is the root).
    Settled,
    /// Entries moved between the child and a sibling; the parent's
    /// separator was rewritten in place.
    Redistributed,
    /// The right sibling of a pair was absorbed into the left one. The
    /// parent must drop the separator at `separator` together with the
    /// child reference to its right.
    Merged { separator: usize },
}
