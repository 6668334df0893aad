//! Common types and utilities shared across leafchain.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration (order parameter, defaults)
//! - Error types
//! - Identifiers (NodeId)

pub mod config;
pub mod error;
mod node_id;

pub use config::TreeConfig;
pub use error::{Error, Result};
pub use node_id::NodeId;
