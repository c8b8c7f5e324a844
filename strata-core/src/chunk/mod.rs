//! Block file linkage for column chunk filters
//!
//! Persists materialized filter bit vectors inside the block file and
//! reconstructs them on read:
//! - Raw `ceil(m/8)`-byte filter regions at recorded offsets, no per-filter
//!   header; all sizing comes from the metadata footer
//! - A checksummed metadata footer carrying each chunk's statistics and
//!   filter parameters
//! - Lazy shell filters that load their bits with a seek and an
//!   exact-length read

mod metadata;
mod reader;
mod writer;

pub use metadata::{BlockMeta, BloomFilterMeta, ColumnChunkMeta};
pub use reader::BlockReader;
pub use writer::{BlockWriter, WriterProperties};

/// Block file magic bytes
pub const MAGIC: &[u8; 4] = b"STRA";

/// Block file format version
pub const FORMAT_VERSION: u32 = 1;
