//! Index nodes - separator keys and child references.
//!
//! An [`IndexNode`] with n keys has n+1 children. Separator convention:
//! everything under `children[i]` is strictly less than `keys[i]`, and
//! everything under `children[n]` is >= `keys[n-1]`.
//!
//! Unlike a leaf split, an index split *moves* its middle key up: the
//! promoted separator exists only in the parent afterwards.
//!
//! ```text
//!  before (2D+1 keys, D = 2):   @ 10 20 30 40 50 @   (6 children c0..c5)
//!  after:                       @ 10 20 @ (c0 c1 c2)   @ 40 50 @ (c3 c4 c5)
//!  separator for the parent:    30
//! ```

use tracing::debug;

use crate::common::NodeId;
use crate::index::btree::arena::NodeArena;
use crate::index::btree::node::{KeyContainer, Node, Rebalance, Split};

#[derive(Debug)]
pub(crate) struct IndexNode<K> {
    keys: KeyContainer<K>,
    /// Always `keys.len() + 1` entries, all leaves or all index nodes.
    children: Vec<NodeId>,
}

impl<K> IndexNode<K> {
    /// A root created by a split: one separator, two children.
    pub(crate) fn new_root(separator: K, left: NodeId, right: NodeId) -> Self {
        Self::from_parts(vec![separator], vec![left, right])
    }

    pub(crate) fn from_parts(keys: Vec<K>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(keys.len() + 1, children.len());
        Self {
            keys: KeyContainer::from_vec(keys),
            children,
        }
    }

    #[inline]
    pub(crate) fn keys(&self) -> &KeyContainer<K> {
        &self.keys
    }

    #[inline]
    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub(crate) fn child_at(&self, i: usize) -> NodeId {
        self.children[i]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_overflowed(&self, order: usize) -> bool {
        self.keys.is_overflowed(order)
    }

    #[inline]
    pub(crate) fn is_underflowed(&self, order: usize) -> bool {
        self.keys.is_underflowed(order)
    }

    /// Insert a promoted separator at `position` with its new right-hand
    /// child at `position + 1`.
    pub(crate) fn insert_sorted(&mut self, separator: K, child: NodeId, position: usize) {
        self.keys.insert_key_at(position, separator);
        self.children.insert(position + 1, child);
    }

    /// Drop the separator at `position` and the child to its right.
    pub(crate) fn remove_entry(&mut self, position: usize) -> (K, NodeId) {
        let key = self.keys.remove_key_at(position);
        let child = self.children.remove(position + 1);
        (key, child)
    }

    pub(crate) fn replace_separator(&mut self, position: usize, separator: K) -> K {
        self.keys.replace_key_at(position, separator)
    }

    /// Split an overflowed node: keep the first D keys and D+1 children,
    /// return the middle key and a new node with the rest.
    fn split_off(&mut self, order: usize) -> Option<(K, Self)> {
        let right_keys = self.keys.split_off(order + 1);
        let right_children = self.children.split_off(order + 1);
        let separator = self.keys.pop_key()?;
        Some((
            separator,
            Self {
                keys: right_keys,
                children: right_children,
            },
        ))
    }

    fn pop_back(&mut self) -> Option<(K, NodeId)> {
        let key = self.keys.pop_key()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    fn pop_front(&mut self) -> Option<(K, NodeId)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove_key_at(0), self.children.remove(0)))
    }

    fn push_back(&mut self, key: K, child: NodeId) {
        self.keys.push_key(key);
        self.children.push(child);
    }

    fn push_front(&mut self, key: K, child: NodeId) {
        self.keys.insert_key_at(0, key);
        self.children.insert(0, child);
    }
}

impl<K: Ord> IndexNode<K> {
    /// Position of the child whose subtree may hold `key`.
    ///
    /// Keys equal to a separator go right, matching the leaf split that
    /// copies its separator into the right leaf.
    pub(crate) fn select_child(&self, key: &K) -> usize {
        if self.keys.len() == 1 {
            return if key < self.keys.key_at(0) { 0 } else { 1 };
        }
        self.keys.upper_bound(key)
    }
}

impl<K> Default for IndexNode<K> {
    fn default() -> Self {
        Self {
            keys: KeyContainer::new(),
            children: Vec::new(),
        }
    }
}

/// Split an overflowed index node in place, returning the promoted middle
/// key and the new right node.
pub(crate) fn split<K, V>(arena: &mut NodeArena<K, V>, index_id: NodeId, order: usize) -> Split<K> {
    let Some((separator, right)) = arena.index_mut(index_id).split_off(order) else {
        unreachable!("{} split with no middle key", index_id);
    };
    let right_len = right.len();
    let right_id = arena.alloc(Node::Index(right));

    debug!(
        left = %index_id,
        right = %right_id,
        left_len = order,
        right_len,
        "split index node"
    );

    Split {
        separator,
        right: right_id,
    }
}

/// Restore the size bound of one of two adjacent index nodes under
/// `parent_id`, rotating keys through the parent separator at `separator`.
///
/// - Combined size >= 2D: one key at a time goes up from the larger node
///   and the old separator comes down into the smaller one, each carrying
///   the child reference on that edge, until both hold at least D.
/// - Otherwise: the separator is pulled down into the left node, followed
///   by all of the right node's keys and children. The right node is freed
///   and the caller must drop the separator from the parent.
pub(crate) fn merge_or_redistribute<K: Clone, V>(
    arena: &mut NodeArena<K, V>,
    left_id: NodeId,
    right_id: NodeId,
    parent_id: NodeId,
    separator: usize,
    order: usize,
) -> Rebalance {
    let mut left = arena.take_index(left_id);
    let mut right = arena.take_index(right_id);
    let parent = arena.index_mut(parent_id);

    if left.len() + right.len() >= 2 * order {
        if left.len() > right.len() {
            while left.len() > order {
                let Some((up, child)) = left.pop_back() else {
                    break;
                };
                let down = parent.replace_separator(separator, up);
                right.push_front(down, child);
            }
        } else {
            while left.len() < order {
                let Some((up, child)) = right.pop_front() else {
                    break;
                };
                let down = parent.replace_separator(separator, up);
                left.push_back(down, child);
            }
        }
        debug!(
            left = %left_id,
            right = %right_id,
            left_len = left.len(),
            right_len = right.len(),
            "redistributed index nodes"
        );

        *arena.index_mut(left_id) = left;
        *arena.index_mut(right_id) = right;
        return Rebalance::Redistributed;
    }

    let down = parent.keys().key_at(separator).clone();
    left.keys.push_key(down);
    left.keys.append(&mut right.keys);
    left.children.append(&mut right.children);

    debug!(left = %left_id, freed = %right_id, separator, "merged index nodes");

    *arena.index_mut(left_id) = left;
    arena.release(right_id);
    Rebalance::Merged { separator }
}
