//! Structural statistics for a B+Tree.

use std::fmt;

/// Counters for every structural transition the tree has performed.
///
/// The tree is single-threaded and mutated through `&mut self`, so these
/// are plain integers; [`BPlusTree::stats`](crate::BPlusTree::stats) hands
/// out a copy.
///
/// # Example
/// ```
/// use leafchain::BPlusTree;
///
/// let mut tree = BPlusTree::new(1).unwrap();
/// for k in 0..3 {
///     tree.insert(k, k);
/// }
///
/// let stats = tree.stats();
/// assert_eq!(stats.leaf_splits, 1);
/// assert_eq!(stats.root_splits, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Leaves split on overflow.
    pub leaf_splits: u64,

    /// Index nodes split on overflow.
    pub index_splits: u64,

    /// Times a split reached the root and added a level.
    pub root_splits: u64,

    /// Underflows fixed by moving entries between siblings.
    pub redistributions: u64,

    /// Underflows fixed by merging two siblings.
    pub merges: u64,

    /// Times an empty index root was replaced by its only child.
    pub root_collapses: u64,
}

impl TreeStats {
    /// Total node splits (leaf and index).
    pub fn splits(&self) -> u64 {
        self.leaf_splits + self.index_splits
    }

    /// Fraction of underflows that were resolved by merging (0.0 to 1.0).
    pub fn merge_rate(&self) -> f64 {
        let total = self.redistributions + self.merges;
        if total == 0 {
            0.0
        } else {
            self.merges as f64 / total as f64
        }
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {}, root_splits: {}, redistributions: {}, merges: {}, root_collapses: {} }}",
            self.splits(),
            self.root_splits,
            self.redistributions,
            self.merges,
            self.root_collapses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default_zero() {
        let stats = TreeStats::default();
        assert_eq!(stats.splits(), 0);
        assert_eq!(stats.merge_rate(), 0.0);
    }

    #[test]
    fn test_merge_rate() {
        let stats = TreeStats {
            redistributions: 3,
            merges: 1,
            ..TreeStats::default()
        };
        assert_eq!(stats.merge_rate(), 0.25);
    }

    #[test]
    fn test_stats_display() {
        let stats = TreeStats {
            leaf_splits: 4,
            index_splits: 1,
            root_splits: 2,
            merges: 3,
            ..TreeStats::default()
        };
        let display = format!("{}", stats);

        assert!(display.contains("splits: 5"));
        assert!(display.contains("root_splits: 2"));
        assert!(display.contains("merges: 3"));
    }
}
