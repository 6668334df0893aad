//! Bulk loading by replaying single inserts.
//!
//! No bottom-up build: entries go through [`BPlusTree::insert`] one at a
//! time, in input order, so the resulting shape is exactly what the same
//! sequence of `insert` calls would produce.

use crate::common::{Result, TreeConfig};
use crate::BPlusTree;

/// Insert every `(key, value)` from `entries` into `tree`, in order.
///
/// Later duplicates overwrite earlier ones. Returns the number of keys that
/// were new to the tree.
///
/// # Example
/// ```
/// use leafchain::{bulk_insert, BPlusTree};
///
/// let mut tree = BPlusTree::new(3).unwrap();
/// let added = bulk_insert(&mut tree, [(2, "b"), (1, "a"), (2, "B")]);
///
/// assert_eq!(added, 2);
/// assert_eq!(tree.get(&2), Some(&"B"));
/// ```
pub fn bulk_insert<K, V, I>(tree: &mut BPlusTree<K, V>, entries: I) -> usize
where
    K: Ord + Clone,
    I: IntoIterator<Item = (K, V)>,
{
    let before = tree.len();
    for (key, value) in entries {
        tree.insert(key, value);
    }
    tree.len() - before
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Build a tree of order `order` from `entries`.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < 1`
    pub fn from_entries<I>(order: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::with_config(TreeConfig::new(order)?);
        bulk_insert(&mut tree, entries);
        Ok(tree)
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BPlusTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        bulk_insert(self, iter);
    }
}
