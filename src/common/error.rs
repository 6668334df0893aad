//! Error types for leafchain.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All user-visible errors in leafchain.
///
/// The index has a single failure mode: asking for a tree whose order is
/// too small to keep any node balanced. Everything else is either a normal
/// outcome (a missing key is `None`, not an error) or an internal bug.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The order parameter D was below the minimum.
    ///
    /// Every non-root node must hold between D and 2D keys, so D = 0 would
    /// allow empty nodes anywhere in the tree.
    #[error("invalid tree order {order}: must be at least {min}")]
    InvalidOrder { order: usize, min: usize },
}
