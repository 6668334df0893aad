//! leafchain - an in-memory B+Tree with a linked leaf level.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           leafchain                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          SharedIndex (index/shared.rs)                   │   │
//! │  │        parking_lot::RwLock<BPlusTree<K, V>>              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          BPlusTree driver (index/btree/tree.rs)          │   │
//! │  │   get | range_from | range_to | insert | remove          │   │
//! │  │   root growth on split, root collapse on merge           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │      Index nodes              Leaf nodes                 │   │
//! │  │  separators + children   entries + prev/next chain       │   │
//! │  │        split / merge / redistribute per kind             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            NodeArena (index/btree/arena.rs)              │   │
//! │  │         Vec of slots + free list, addressed by NodeId    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, Error, TreeConfig)
//! - [`index`] - The B+Tree and its locked wrapper
//!
//! # Quick Start
//! ```
//! use leafchain::BPlusTree;
//!
//! let mut tree = BPlusTree::new(3).unwrap();
//! for (i, word) in ["delta", "alpha", "echo", "bravo", "charlie"].iter().enumerate() {
//!     tree.insert(*word, i);
//! }
//!
//! assert_eq!(tree.get(&"charlie"), Some(&4));
//! assert_eq!(tree.range_from(&"d"), vec![&0, &2]);
//! assert!(tree.validate().is_ok());
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::{Error, NodeId, Result, TreeConfig};
pub use index::btree::{bulk_insert, BPlusTree, InvariantViolation, Iter, TreeStats};
pub use index::SharedIndex;
