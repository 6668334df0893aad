//! Configuration for leafchain trees.

use crate::common::{Error, Result};

/// Smallest legal order parameter D.
///
/// With D = 1 a non-root node holds 1 or 2 keys; below that a node could be
/// empty and still count as balanced.
pub const MIN_ORDER: usize = 1;

/// Order used when none is supplied.
pub const DEFAULT_ORDER: usize = 2;

/// Construction parameters for a [`BPlusTree`](crate::BPlusTree).
///
/// The order D bounds every non-root node to `D..=2D` keys. It is fixed for
/// the lifetime of the tree.
///
/// # Example
/// ```
/// use leafchain::TreeConfig;
///
/// let config = TreeConfig::new(3).unwrap();
/// assert_eq!(config.min_keys(), 3);
/// assert_eq!(config.max_keys(), 6);
///
/// assert!(TreeConfig::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    order: usize,
}

impl TreeConfig {
    /// Create a config with order `order`.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < MIN_ORDER`
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder {
                order,
                min: MIN_ORDER,
            });
        }
        Ok(Self { order })
    }

    /// The order parameter D.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Minimum number of keys in a non-root node (D).
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.order
    }

    /// Maximum number of keys in any node (2D).
    #[inline]
    pub fn max_keys(&self) -> usize {
        2 * self.order
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let config = TreeConfig::default();
        assert_eq!(config.order(), DEFAULT_ORDER);
        assert_eq!(config.max_keys(), 2 * DEFAULT_ORDER);
    }

    #[test]
    fn test_rejects_zero_order() {
        assert_eq!(
            TreeConfig::new(0),
            Err(Error::InvalidOrder { order: 0, min: 1 })
        );
    }

    #[test]
    fn test_minimum_order_accepted() {
        let config = TreeConfig::new(MIN_ORDER).unwrap();
        assert_eq!(config.min_keys(), 1);
        assert_eq!(config.max_keys(), 2);
    }
}
