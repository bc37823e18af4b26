//! Chain module for participating blockchain networks.
//!
//! This module handles:
//! - Chain metadata types
//! - The read-only chain registry
//! - Registry refresh from an external metadata feed

pub mod registry;
pub mod types;

pub use registry::{fetch_registry, ChainRegistry};
pub use types::ChainInfo;
