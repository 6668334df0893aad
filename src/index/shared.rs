//! Serialized multi-threaded access to a B+Tree.
//!
//! [`BPlusTree`] has no internal synchronization: a reader walking the leaf
//! chain while another thread merges leaves would see a broken chain.
//! [`SharedIndex`] puts the whole tree behind one `RwLock` so readers share
//! it and each writer has it to itself for a complete structural transition.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{Result, TreeConfig};
use crate::index::btree::TreeStats;
use crate::BPlusTree;

/// A [`BPlusTree`] behind a reader/writer lock.
///
/// # Thread Safety
/// - lookups and range scans: shared (`read`) lock, values are cloned out
/// - insert / remove: exclusive (`write`) lock for the whole operation
///
/// # Example
/// ```
/// use leafchain::SharedIndex;
/// use std::sync::Arc;
/// use std::thread;
///
/// let index = Arc::new(SharedIndex::new(4).unwrap());
///
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let index = Arc::clone(&index);
///         thread::spawn(move || {
///             for k in 0..100 {
///                 index.insert(t * 1000 + k, k);
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(index.len(), 400);
/// assert_eq!(index.get(&2042), Some(42));
/// ```
#[derive(Debug)]
pub struct SharedIndex<K, V> {
    tree: RwLock<BPlusTree<K, V>>,
}

impl<K, V> SharedIndex<K, V> {
    /// Create an empty shared tree of order `order`.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < 1`
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(order)?))
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self::from_tree(BPlusTree::with_config(config))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BPlusTree<K, V>) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Take the tree back out.
    pub fn into_inner(self) -> BPlusTree<K, V> {
        self.tree.into_inner()
    }

    /// Hold the shared lock for several reads against one consistent tree.
    pub fn read(&self) -> RwLockReadGuard<'_, BPlusTree<K, V>> {
        self.tree.read()
    }

    /// Hold the exclusive lock for a batch of mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, BPlusTree<K, V>> {
        self.tree.write()
    }

    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.read().stats()
    }
}

impl<K: Ord + Clone, V: Clone> SharedIndex<K, V> {
    pub fn get(&self, key: &K) -> Option<V> {
        self.tree.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.read().contains_key(key)
    }

    /// Values with keys `>= key`, ascending.
    pub fn range_from(&self, key: &K) -> Vec<V> {
        self.tree.read().range_from(key).into_iter().cloned().collect()
    }

    /// Values with keys `<= key`, ascending.
    pub fn range_to(&self, key: &K) -> Vec<V> {
        self.tree.read().range_to(key).into_iter().cloned().collect()
    }
}

impl<K: Ord + Clone, V> SharedIndex<K, V> {
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.tree.write().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.tree.write().remove(key)
    }
}
