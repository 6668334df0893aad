//! Node arena - owning storage for every node of one tree.
//!
//! Nodes live in a `Vec` of slots addressed by [`NodeId`]. Parents refer to
//! children by id and leaves refer to their siblings by id, so no node is
//! ever owned through a pointer: freeing a slot during a merge cannot leave
//! a dangling reference, only a stale id (which is a bug and panics).
//!
//! Freed slots go on a LIFO free list and are reused by the next split.

use crate::common::NodeId;
use crate::index::btree::internal::IndexNode;
use crate::index::btree::leaf::LeafNode;
use crate::index::btree::node::Node;

#[derive(Debug)]
pub(crate) struct NodeArena<K, V> {
    /// Node slots; `None` marks a freed slot.
    slots: Vec<Option<Node<K, V>>>,

    /// Stack of freed slot ids (LIFO for cache locality).
    free_list: Vec<NodeId>,

    /// Number of occupied slots.
    live: usize,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Store `node`, reusing a freed slot when one is available.
    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        self.live += 1;
        match self.free_list.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::new(self.slots.len() - 1)
            }
        }
    }

    /// Remove the node at `id` and hand its slot back to the free list.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("double release of {}", id));
        self.free_list.push(id);
        self.live -= 1;
        node
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Drop every node.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.live = 0;
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("dangling reference to {}", id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        Self::occupied(self.slots.get_mut(id.0), id)
    }

    pub(crate) fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        match self.get(id) {
            Node::Leaf(leaf) => leaf,
            Node::Index(_) => panic!("{} is an index node, expected a leaf", id),
        }
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        match self.get_mut(id) {
            Node::Leaf(leaf) => leaf,
            Node::Index(_) => panic!("{} is an index node, expected a leaf", id),
        }
    }

    pub(crate) fn index(&self, id: NodeId) -> &IndexNode<K> {
        match self.get(id) {
            Node::Index(index) => index,
            Node::Leaf(_) => panic!("{} is a leaf, expected an index node", id),
        }
    }

    pub(crate) fn index_mut(&mut self, id: NodeId) -> &mut IndexNode<K> {
        match self.get_mut(id) {
            Node::Index(index) => index,
            Node::Leaf(_) => panic!("{} is a leaf, expected an index node", id),
        }
    }

    /// Borrow two distinct leaves mutably at once.
    pub(crate) fn leaf_pair_mut(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> (&mut LeafNode<K, V>, &mut LeafNode<K, V>) {
        match self.pair_mut(a, b) {
            (Node::Leaf(left), Node::Leaf(right)) => (left, right),
            _ => panic!("{} and {} are not both leaves", a, b),
        }
    }

    /// Move an index node's contents out, leaving an empty node in its slot.
    ///
    /// The slot stays allocated; put the node back with [`Self::index_mut`]
    /// or free it with [`Self::release`].
    pub(crate) fn take_index(&mut self, id: NodeId) -> IndexNode<K> {
        std::mem::take(self.index_mut(id))
    }

    fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K, V>, &mut Node<K, V>) {
        assert_ne!(a, b, "cannot borrow {} twice", a);
        if a.0 < b.0 {
            let (lo, hi) = self.slots.split_at_mut(b.0);
            (
                Self::occupied(lo.get_mut(a.0), a),
                Self::occupied(hi.first_mut(), b),
            )
        } else {
            let (lo, hi) = self.slots.split_at_mut(a.0);
            (
                Self::occupied(hi.first_mut(), a),
                Self::occupied(lo.get_mut(b.0), b),
            )
        }
    }

    fn occupied(slot: Option<&mut Option<Node<K, V>>>, id: NodeId) -> &mut Node<K, V> {
        slot.and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("dangling reference to {}", id))
    }
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
