//! Bloom filter membership indexes
//!
//! Per-column probabilistic membership structures with:
//! - Closed-form parameter derivation from (n, p) or (m, k)
//! - Double hashing over two seeded xxh3-64 base hashes
//! - Byte-aligned bit vector serialization for file-offset bookkeeping
//! - Cardinality-gated construction via per-column value tracking

mod bitvec;
mod config;
mod filter;
mod hash;
mod tracker;

pub use bitvec::BitVector;
pub use config::{optimal_k, optimal_m, optimal_n, optimal_p, FilterConfig, FilterOptions};
pub use filter::BloomFilter;
pub use hash::HashStrategy;
pub use tracker::{BloomFilterPolicy, UniqueValueTracker};
