//! Index structures.
//!
//! - [`btree`] - the single-threaded B+Tree
//! - [`SharedIndex`] - the same tree behind a reader/writer lock

pub mod btree;
mod shared;

pub use btree::{BPlusTree, InvariantViolation, Iter, TreeStats};
pub use shared::SharedIndex;
