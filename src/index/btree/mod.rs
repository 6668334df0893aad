//! In-memory B+Tree.
//!
//! # Layout
//! - [`tree`] - the driver: descent, root growth and collapse
//! - `leaf` / `internal` - per-kind node operations (split, merge, redistribute)
//! - `node` / `arena` - shared key storage and id-addressed node slots
//! - [`iter`] - ordered iteration along the leaf chain
//! - `dump` / [`validate`] - test and debugging surfaces
//! - [`bulk`] - loading from an iterator
//! - [`stats`] - structural counters

mod arena;
pub mod bulk;
mod dump;
mod internal;
pub mod iter;
mod leaf;
mod node;
pub mod stats;
pub mod tree;
pub mod validate;

pub use bulk::bulk_insert;
pub use iter::Iter;
pub use stats::TreeStats;
pub use tree::BPlusTree;
pub use validate::InvariantViolation;
