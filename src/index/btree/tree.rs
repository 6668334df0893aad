//! The B+Tree driver.
//!
//! [`BPlusTree`] owns the node arena and the root id. Every mutation is a
//! recursive descent from the root to one leaf; structural changes travel
//! back up as return values:
//!
//! - insert returns an [`Insertion`]: either nothing for the parent to do, or
//!   a [`Split`] whose separator and right node the parent must adopt;
//! - delete returns a [`Rebalance`]: either settled, or the position of a
//!   parent separator consumed by a merge.
//!
//! The driver applies the root-level consequences: a new two-child root when
//! the root splits, and root collapse when an index root runs out of keys.

use tracing::{debug, trace};

use crate::common::{NodeId, Result, TreeConfig};
use crate::index::btree::arena::NodeArena;
use crate::index::btree::internal::{self, IndexNode};
use crate::index::btree::iter::Iter;
use crate::index::btree::leaf::{self, LeafNode};
use crate::index::btree::node::{Insertion, Node, Rebalance, Split};
use crate::index::btree::stats::TreeStats;

/// An in-memory B+Tree of fixed order D.
///
/// Entries live only in leaves; leaves are linked both ways so range scans
/// walk sideways instead of re-descending. Every non-root node holds
/// between D and 2D keys.
///
/// Inserting an existing key overwrites its value (and returns the old one).
///
/// # Thread Safety
/// None internally: mutation takes `&mut self`. Use
/// [`SharedIndex`](crate::SharedIndex) or another lock to share a tree.
///
/// # Example
/// ```
/// use leafchain::BPlusTree;
///
/// let mut tree = BPlusTree::new(2).unwrap();
/// for (k, v) in [(5, "five"), (1, "one"), (9, "nine"), (3, "three")] {
///     tree.insert(k, v);
/// }
///
/// assert_eq!(tree.get(&3), Some(&"three"));
/// assert_eq!(tree.get(&4), None);
/// assert_eq!(tree.range_from(&4), vec![&"five", &"nine"]);
/// assert_eq!(tree.range_to(&4), vec![&"one", &"three"]);
///
/// assert_eq!(tree.remove(&5), Some("five"));
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug)]
pub struct BPlusTree<K, V> {
    arena: NodeArena<K, V>,
    root: Option<NodeId>,
    config: TreeConfig,
    len: usize,
    stats: TreeStats,
}

impl<K, V> BPlusTree<K, V> {
    /// Create an empty tree of order `order`.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < 1`
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(order)?))
    }

    /// Create an empty tree from a validated config.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            config,
            len: 0,
            stats: TreeStats::default(),
        }
    }

    /// The order parameter D.
    #[inline]
    pub fn order(&self) -> usize {
        self.config.order()
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels: 0 when empty, 1 for a lone leaf root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            height += 1;
            cursor = match self.arena.get(id) {
                Node::Leaf(_) => None,
                Node::Index(index) => Some(index.child_at(0)),
            };
        }
        height
    }

    /// Number of live nodes (leaves and index nodes).
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Copy of the structural counters.
    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    /// Reset the structural counters to zero.
    pub fn reset_stats(&mut self) {
        self.stats = TreeStats::default();
    }

    /// Remove every entry. Order and stats are kept.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Ascending iterator over all entries, following the leaf chain.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.arena, self.leftmost_leaf(), self.len)
    }

    /// Smallest entry.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.arena.leaf(self.leftmost_leaf()?);
        leaf.entries().next()
    }

    /// Largest entry.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Node::Index(index) = self.arena.get(id) {
            id = index.child_at(index.children().len() - 1);
        }
        self.arena.leaf(id).entries().next_back()
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn arena(&self) -> &NodeArena<K, V> {
        &self.arena
    }

    #[cfg(test)]
    pub(crate) fn arena_mut(&mut self) -> &mut NodeArena<K, V> {
        &mut self.arena
    }

    pub(crate) fn leftmost_leaf(&self) -> Option<NodeId> {
        let mut id = self.root?;
        while let Node::Index(index) = self.arena.get(id) {
            id = index.child_at(0);
        }
        Some(id)
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let leaf = self.find_leaf(key)?;
        self.arena.leaf(leaf).find_exact(key)
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf = self.find_leaf(key)?;
        self.arena.leaf_mut(leaf).find_exact_mut(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Values whose keys are `>= key`, in ascending key order.
    ///
    /// `key` need not be present.
    pub fn range_from(&self, key: &K) -> Vec<&V> {
        let Some(start) = self.find_leaf(key) else {
            return Vec::new();
        };

        let boundary = self.arena.leaf(start);
        let mut values: Vec<&V> = boundary
            .entries()
            .filter(|(k, _)| *k >= key)
            .map(|(_, v)| v)
            .collect();

        // Every later leaf lies wholly above the bound
        let mut cursor = boundary.next();
        while let Some(id) = cursor {
            let leaf = self.arena.leaf(id);
            values.extend(leaf.values());
            cursor = leaf.next();
        }
        trace!(leaf = %start, found = values.len(), "range_from");
        values
    }

    /// Values whose keys are `<= key`, in ascending key order.
    ///
    /// `key` need not be present.
    pub fn range_to(&self, key: &K) -> Vec<&V> {
        let Some(end) = self.find_leaf(key) else {
            return Vec::new();
        };

        let boundary = self.arena.leaf(end);
        let mut earlier = Vec::new();
        let mut cursor = boundary.prev();
        while let Some(id) = cursor {
            earlier.push(id);
            cursor = self.arena.leaf(id).prev();
        }

        // Every earlier leaf lies wholly below the bound
        let mut values: Vec<&V> = Vec::new();
        for id in earlier.into_iter().rev() {
            values.extend(self.arena.leaf(id).values());
        }
        values.extend(
            boundary
                .entries()
                .take_while(|(k, _)| *k <= key)
                .map(|(_, v)| v),
        );
        trace!(leaf = %end, found = values.len(), "range_to");
        values
    }

    /// Insert `key` -> `value`.
    ///
    /// Returns the previous value if `key` was already present; the entry
    /// is then updated in place and the tree shape does not change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root) = self.root else {
            let leaf = LeafNode::with_entry(key, value);
            self.root = Some(self.arena.alloc(Node::Leaf(leaf)));
            self.len = 1;
            return None;
        };

        match self.insert_entry(root, key, value) {
            Insertion::Replaced(old) => Some(old),
            Insertion::Inserted => {
                self.len += 1;
                None
            }
            Insertion::Split(split) => {
                self.len += 1;
                self.grow_root(root, split);
                None
            }
        }
    }

    /// Remove `key`, returning its value. Absent keys leave the tree as is.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root?;
        let (value, _) = self.remove_entry(root, None, key)?;
        self.len -= 1;
        self.shrink_root(root);
        Some(value)
    }

    /// Descend from the root to the leaf whose key range covers `key`.
    fn find_leaf(&self, key: &K) -> Option<NodeId> {
        let mut id = self.root?;
        while let Node::Index(index) = self.arena.get(id) {
            id = index.child_at(index.select_child(key));
        }
        Some(id)
    }

    /// For an index node: the slot and id of the child covering `key`.
    fn route(&self, node_id: NodeId, key: &K) -> Option<(usize, NodeId)> {
        match self.arena.get(node_id) {
            Node::Leaf(_) => None,
            Node::Index(index) => {
                let slot = index.select_child(key);
                Some((slot, index.child_at(slot)))
            }
        }
    }

    fn insert_entry(&mut self, node_id: NodeId, key: K, value: V) -> Insertion<K, V> {
        let order = self.config.order();

        let Some((slot, child)) = self.route(node_id, &key) else {
            let node = self.arena.leaf_mut(node_id);
            if let Some(old) = node.insert_sorted(key, value) {
                return Insertion::Replaced(old);
            }
            if !node.is_overflowed(order) {
                return Insertion::Inserted;
            }
            self.stats.leaf_splits += 1;
            return Insertion::Split(leaf::split(&mut self.arena, node_id, order));
        };

        match self.insert_entry(child, key, value) {
            Insertion::Split(split) => {
                let index = self.arena.index_mut(node_id);
                index.insert_sorted(split.separator, split.right, slot);
                if !index.is_overflowed(order) {
                    return Insertion::Inserted;
                }
                self.stats.index_splits += 1;
                Insertion::Split(internal::split(&mut self.arena, node_id, order))
            }
            other => other,
        }
    }

    /// Delete `key` below `node_id`.
    ///
    /// `parent` is the parent id and this node's slot in it, `None` for the
    /// root. Returns `None` if the key is absent (nothing was modified).
    fn remove_entry(
        &mut self,
        node_id: NodeId,
        parent: Option<(NodeId, usize)>,
        key: &K,
    ) -> Option<(V, Rebalance)> {
        let order = self.config.order();

        let Some((slot, child)) = self.route(node_id, key) else {
            let node = self.arena.leaf_mut(node_id);
            let value = node.remove(key)?;
            let underflowed = node.is_underflowed(order);
            let rebalance = match parent {
                Some((parent_id, slot)) if underflowed => {
                    self.rebalance(node_id, parent_id, slot, true)
                }
                _ => Rebalance::Settled,
            };
            return Some((value, rebalance));
        };

        let (value, below) = self.remove_entry(child, Some((node_id, slot)), key)?;
        let Rebalance::Merged { separator } = below else {
            return Some((value, Rebalance::Settled));
        };

        let index = self.arena.index_mut(node_id);
        index.remove_entry(separator);
        let underflowed = index.is_underflowed(order);
        let rebalance = match parent {
            Some((parent_id, slot)) if underflowed => {
                self.rebalance(node_id, parent_id, slot, false)
            }
            _ => Rebalance::Settled,
        };
        Some((value, rebalance))
    }

    /// Fix an underflowed child at `slot` of `parent_id` against a sibling
    /// under the same parent: the left one when it exists, else the right.
    fn rebalance(&mut self, node_id: NodeId, parent_id: NodeId, slot: usize, is_leaf: bool) -> Rebalance {
        let order = self.config.order();
        let parent = self.arena.index(parent_id);
        debug_assert!(parent.children().len() >= 2, "{} has no sibling", node_id);

        let (left, right, separator) = if slot > 0 {
            (parent.child_at(slot - 1), node_id, slot - 1)
        } else {
            (node_id, parent.child_at(1), 0)
        };

        let outcome = if is_leaf {
            leaf::merge_or_redistribute(&mut self.arena, left, right, parent_id, separator, order)
        } else {
            internal::merge_or_redistribute(&mut self.arena, left, right, parent_id, separator, order)
        };

        match outcome {
            Rebalance::Redistributed => self.stats.redistributions += 1,
            Rebalance::Merged { .. } => self.stats.merges += 1,
            Rebalance::Settled => {}
        }
        outcome
    }

    /// The root split: hang both halves under a new root.
    fn grow_root(&mut self, old_root: NodeId, split: Split<K>) {
        let new_root = IndexNode::new_root(split.separator, old_root, split.right);
        let new_root = self.arena.alloc(Node::Index(new_root));
        self.root = Some(new_root);
        self.stats.root_splits += 1;
        debug!(root = %new_root, height = self.height(), "root split");
    }

    /// After a delete: drop an emptied leaf root, or replace an index root
    /// with no keys by its only child.
    fn shrink_root(&mut self, root: NodeId) {
        match self.arena.get(root) {
            Node::Leaf(leaf) if leaf.is_empty() => {
                self.arena.release(root);
                self.root = None;
                debug!(freed = %root, "tree emptied");
            }
            Node::Index(index) if index.keys().is_empty() => {
                let child = index.child_at(0);
                self.arena.release(root);
                self.root = Some(child);
                self.stats.root_collapses += 1;
                debug!(root = %child, freed = %root, "root collapsed");
            }
            _ => {}
        }
    }
}

impl<K, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
