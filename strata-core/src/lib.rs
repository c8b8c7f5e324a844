//! Strata Core - Columnar Block Format with Membership Indexes
//!
//! The membership-index layer of the Strata columnar file format:
//! per-column Bloom filters that let readers skip column chunks for
//! equality predicates without touching the data pages.
//!
//! # Architecture
//!
//! The layer is built from the following components:
//!
//! - **Bloom filters**: parameter derivation, double hashing, and a compact
//!   bit vector with file-offset-aware serialization
//! - **Unique value tracking**: per-column cardinality accumulation that
//!   decides at block close whether a filter is worth building
//! - **Chunk writer/reader**: persists filter bit vectors at recorded file
//!   offsets and reconstructs lazily-loaded shells from block metadata
//! - **Predicate pruning**: a typed predicate tree that fetches statistics
//!   and drops blocks on definite non-membership

pub mod bloom;
pub mod chunk;
pub mod predicate;

mod error;
mod types;

pub use error::{Result, StrataError};
pub use types::*;

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Bloom filter false positive rate
    pub const BLOOM_FALSE_POSITIVE: f32 = 0.01;

    /// Minimum unique/total ratio recorded alongside a column chunk
    pub const BLOOM_UNIQUE_RATIO_THRESHOLD: f32 = 0.2;

    /// Minimum values seen in a block before a filter is built
    pub const BLOOM_VALUE_COUNT_THRESHOLD: u32 = 20;
}
