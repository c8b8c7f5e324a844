//! Block metadata and footer serialization

use crate::bloom::{BloomFilter, FilterConfig, FilterOptions, HashStrategy};
use crate::{Result, StrataError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Persisted parameters of one column chunk's filter.
///
/// Everything a reader needs to reconstruct a shell filter and locate its
/// bits: the byte stream itself carries no sizing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomFilterMeta {
    /// Offset of the serialized bit vector in the block file
    pub file_offset: u64,
    /// Length in bytes of the serialized bit vector
    pub byte_length: u64,
    /// Bit vector size (m)
    pub bits: u64,
    /// Hash positions per element (k)
    pub hashes: u32,
    /// Persisted hash strategy id
    pub strategy: u8,
    /// Unique elements the filter was sized for (n)
    pub expected_elements: u64,
    /// Configured false positive probability (p)
    pub false_positive: f64,
}

impl BloomFilterMeta {
    /// Capture the parameters and file linkage of a written filter
    pub fn from_filter(filter: &BloomFilter) -> Self {
        let config = filter.config();
        Self {
            file_offset: filter.file_offset(),
            byte_length: filter.byte_length(),
            bits: config.bits(),
            hashes: config.hashes(),
            strategy: config.strategy().id(),
            expected_elements: config.expected_elements(),
            false_positive: config.false_positive(),
        }
    }

    /// Rebuild the filter configuration these parameters describe
    pub fn to_config(&self) -> Result<FilterConfig> {
        FilterOptions::new()
            .bits(self.bits)
            .hashes(self.hashes)
            .expected_elements(self.expected_elements)
            .false_positive(self.false_positive)
            .strategy(HashStrategy::from_id(self.strategy)?)
            .complete()
    }
}

/// Statistics persisted for one column chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChunkMeta {
    /// Column name
    pub column: String,
    /// Total values written to the chunk
    pub value_count: u64,
    /// Distinct/total ratio observed at block close
    pub unique_ratio: f32,
    /// Filter parameters, when one was built
    pub bloom: Option<BloomFilterMeta>,
}

/// Metadata footer of one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Per-column chunk statistics
    pub columns: Vec<ColumnChunkMeta>,
}

impl BlockMeta {
    /// Look up a column's chunk statistics
    pub fn column(&self, name: &str) -> Option<&ColumnChunkMeta> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Serialize the footer frame with length prefix and CRC checksum
    ///
    /// Format:
    /// - 4 bytes: payload length
    /// - N bytes: bincode payload
    /// - 4 bytes: CRC32 checksum of the payload
    pub fn encode(&self) -> Result<Bytes> {
        let payload =
            bincode::serialize(self).map_err(|e| StrataError::InvalidFormat(e.to_string()))?;

        let mut buf = BytesMut::with_capacity(payload.len() + 8);
        buf.put_u32_le(payload.len() as u32);
        buf.put_slice(&payload);
        buf.put_u32_le(crc32fast::hash(&payload));
        Ok(buf.freeze())
    }

    /// Deserialize a footer frame, validating its checksum
    pub fn decode(data: &[u8]) -> Result<BlockMeta> {
        if data.len() < 8 {
            return Err(StrataError::InvalidFormat("metadata frame too short".into()));
        }

        let mut cursor = std::io::Cursor::new(data);
        let len = cursor.get_u32_le() as usize;
        if data.len() < 8 + len {
            return Err(StrataError::InvalidFormat("incomplete metadata frame".into()));
        }

        let payload = &data[4..4 + len];
        let expected = {
            let mut c = std::io::Cursor::new(&data[4 + len..8 + len]);
            c.get_u32_le()
        };
        let actual = crc32fast::hash(payload);
        if expected != actual {
            return Err(StrataError::ChecksumMismatch { expected, actual });
        }

        bincode::deserialize(payload).map_err(|e| StrataError::InvalidFormat(e.to_string()))
    }
}
