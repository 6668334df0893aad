//! Structural invariant checks.
//!
//! [`BPlusTree::validate`] walks the whole tree and reports the first
//! violated invariant. A violation always means a bug in the mutation
//! engine; tests call this after every operation.
//!
//! Checked:
//! - non-root nodes hold `D..=2D` keys; the root holds `1..=2D`
//! - keys inside each node are strictly ascending
//! - every key lies within the separator bounds inherited from its ancestors
//! - index nodes have `keys + 1` children, and all leaves share one depth
//! - the leaf chain links every leaf, in key order, both ways
//! - the entry count and live node count match what is reachable

use thiserror::Error;

use crate::common::NodeId;
use crate::index::btree::arena::NodeArena;
use crate::index::btree::node::Node;
use crate::BPlusTree;

/// A broken structural invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{node}: holds {keys} keys, outside {min}..={max}")]
    NodeSize {
        node: NodeId,
        keys: usize,
        min: usize,
        max: usize,
    },

    #[error("{node}: keys not strictly ascending at position {position}")]
    Unordered { node: NodeId, position: usize },

    #[error("{node}: key at position {position} lies outside its separator bounds")]
    OutOfBounds { node: NodeId, position: usize },

    #[error("{node}: {children} children for {keys} keys")]
    ChildCount {
        node: NodeId,
        keys: usize,
        children: usize,
    },

    #[error("{node}: leaf at depth {depth}, expected {expected}")]
    UnevenDepth {
        node: NodeId,
        depth: usize,
        expected: usize,
    },

    #[error("{node}: leaf chain link is {found:?}, expected {expected:?}")]
    BrokenChain {
        node: NodeId,
        expected: Option<NodeId>,
        found: Option<NodeId>,
    },

    #[error("tree reports {reported} entries but {reachable} are reachable")]
    EntryCount { reported: usize, reachable: usize },

    #[error("arena holds {live} nodes but {reachable} are reachable")]
    LeakedNodes { live: usize, reachable: usize },
}

/// Walk state shared across the recursive descent.
struct Walk<'a, K, V> {
    arena: &'a NodeArena<K, V>,
    order: usize,
    root: NodeId,
    leaves: Vec<NodeId>,
    leaf_depth: Option<usize>,
    nodes: usize,
    entries: usize,
}

impl<K: Ord, V> Walk<'_, K, V> {
    fn visit(
        &mut self,
        id: NodeId,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(), InvariantViolation> {
        self.nodes += 1;
        let arena = self.arena;
        let node = arena.get(id);
        let keys = node.keys().as_slice();

        let min = if id == self.root { 1 } else { self.order };
        let max = 2 * self.order;
        if keys.len() < min || keys.len() > max {
            return Err(InvariantViolation::NodeSize {
                node: id,
                keys: keys.len(),
                min,
                max,
            });
        }

        if let Some(position) = keys.windows(2).position(|w| w[0] >= w[1]) {
            return Err(InvariantViolation::Unordered {
                node: id,
                position: position + 1,
            });
        }

        // lower <= key < upper
        for (position, key) in keys.iter().enumerate() {
            let below = lower.is_some_and(|lo| key < lo);
            let above = upper.is_some_and(|hi| key >= hi);
            if below || above {
                return Err(InvariantViolation::OutOfBounds { node: id, position });
            }
        }

        match node {
            Node::Leaf(_) => {
                match self.leaf_depth {
                    None => self.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(InvariantViolation::UnevenDepth {
                            node: id,
                            depth,
                            expected,
                        });
                    }
                    Some(_) => {}
                }
                self.leaves.push(id);
                self.entries += keys.len();
            }
            Node::Index(index) => {
                let children = index.children();
                if children.len() != keys.len() + 1 {
                    return Err(InvariantViolation::ChildCount {
                        node: id,
                        keys: keys.len(),
                        children: children.len(),
                    });
                }
                for (i, &child) in children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(&keys[i - 1]) };
                    let hi = if i == keys.len() { upper } else { Some(&keys[i]) };
                    self.visit(child, depth + 1, lo, hi)?;
                }
            }
        }
        Ok(())
    }

    fn check_chain(&self) -> Result<(), InvariantViolation> {
        for (i, &id) in self.leaves.iter().enumerate() {
            let leaf = self.arena.leaf(id);
            let expected_prev = i.checked_sub(1).map(|p| self.leaves[p]);
            let expected_next = self.leaves.get(i + 1).copied();

            if leaf.prev() != expected_prev {
                return Err(InvariantViolation::BrokenChain {
                    node: id,
                    expected: expected_prev,
                    found: leaf.prev(),
                });
            }
            if leaf.next() != expected_next {
                return Err(InvariantViolation::BrokenChain {
                    node: id,
                    expected: expected_next,
                    found: leaf.next(),
                });
            }
        }
        Ok(())
    }
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Check every structural invariant, returning the first violation.
    ///
    /// # Example
    /// ```
    /// use leafchain::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(2).unwrap();
    /// for k in 0..100 {
    ///     tree.insert(k, ());
    /// }
    /// for k in (0..100).step_by(3) {
    ///     tree.remove(&k);
    /// }
    /// assert!(tree.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let arena = self.arena();
        let Some(root) = self.root() else {
            if self.len() != 0 {
                return Err(InvariantViolation::EntryCount {
                    reported: self.len(),
                    reachable: 0,
                });
            }
            if arena.len() != 0 {
                return Err(InvariantViolation::LeakedNodes {
                    live: arena.len(),
                    reachable: 0,
                });
            }
            return Ok(());
        };

        let mut walk = Walk {
            arena,
            order: self.order(),
            root,
            leaves: Vec::new(),
            leaf_depth: None,
            nodes: 0,
            entries: 0,
        };
        walk.visit(root, 0, None, None)?;
        walk.check_chain()?;

        if walk.entries != self.len() {
            return Err(InvariantViolation::EntryCount {
                reported: self.len(),
                reachable: walk.entries,
            });
        }
        if walk.nodes != arena.len() {
            return Err(InvariantViolation::LeakedNodes {
                live: arena.len(),
                reachable: walk.nodes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::btree::leaf::LeafNode;

    #[test]
    fn test_valid_after_growth() {
        let mut tree = BPlusTree::new(2).unwrap();
        for k in (0..200u32).rev() {
            tree.insert(k, k);
        }
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_empty_tree_is_valid() {
        let tree: BPlusTree<u32, u32> = BPlusTree::new(4).unwrap();
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_detects_broken_chain() {
        let mut tree = BPlusTree::new(1).unwrap();
        for k in 0..6u32 {
            tree.insert(k, k);
        }
        let first = tree.leftmost_leaf().unwrap();
        tree.arena_mut().leaf_mut(first).set_next(None);

        assert!(matches!(
            tree.validate(),
            Err(InvariantViolation::BrokenChain { .. })
        ));
    }

    #[test]
    fn test_detects_unordered_leaf() {
        let mut tree: BPlusTree<u32, u32> = BPlusTree::new(2).unwrap();
        tree.insert(1, 1);
        let root = tree.root().unwrap();
        *tree.arena_mut().leaf_mut(root) = LeafNode::from_entries(vec![2, 1], vec![0, 0]);

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Unordered {
                node: root,
                position: 1
            })
        );
    }

    #[test]
    fn test_violation_display() {
        let err = InvariantViolation::NodeSize {
            node: NodeId::new(3),
            keys: 1,
            min: 2,
            max: 4,
        };
        assert_eq!(err.to_string(), "Node(3): holds 1 keys, outside 2..=4");
    }
}
