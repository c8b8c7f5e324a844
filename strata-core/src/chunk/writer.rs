//! Block writer: filter materialization and persistence

use super::{BlockMeta, BloomFilterMeta, ColumnChunkMeta, FORMAT_VERSION, MAGIC};
use crate::bloom::{BloomFilterPolicy, UniqueValueTracker};
use crate::{ColumnValue, Result};
use bytes::{BufMut, BytesMut};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

/// Writer-side filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriterProperties {
    /// Whether column chunk filters are built at all
    pub enable_bloom_filter: bool,
    /// Tolerable false positive probability
    pub false_positive: f32,
    /// Unique/total ratio recorded alongside chunk statistics
    pub unique_ratio_threshold: f32,
    /// Minimum total values seen before a filter is built
    pub value_count_threshold: u32,
}

impl Default for WriterProperties {
    fn default() -> Self {
        Self {
            enable_bloom_filter: true,
            false_positive: crate::config::BLOOM_FALSE_POSITIVE,
            unique_ratio_threshold: crate::config::BLOOM_UNIQUE_RATIO_THRESHOLD,
            value_count_threshold: crate::config::BLOOM_VALUE_COUNT_THRESHOLD,
        }
    }
}

impl WriterProperties {
    /// The tracker policy these properties describe, when filters are on
    pub fn policy(&self) -> Option<BloomFilterPolicy> {
        if !self.enable_bloom_filter {
            return None;
        }
        Some(BloomFilterPolicy::new(
            self.false_positive,
            self.unique_ratio_threshold,
            self.value_count_threshold,
        ))
    }
}

/// Writes one block's membership indexes to a file.
///
/// Values are fed per column during the block's write pass; at
/// [`BlockWriter::finish`] every qualifying column gets a filter sized
/// from its observed cardinality, the filter bit vectors are appended at
/// the running offset, and the recorded `(offset, length)` pairs land in
/// the metadata footer together with the filter parameters.
///
/// File layout:
///
/// ```text
/// [magic "STRA"] [version u32]
/// [filter bit vectors, raw, back to back]
/// [metadata frame: len u32, bincode payload, crc32 u32]
/// [trailer: metadata offset u64, magic "STRA"]
/// ```
pub struct BlockWriter {
    path: PathBuf,
    trackers: BTreeMap<String, UniqueValueTracker>,
    value_counts: BTreeMap<String, u64>,
    policy: Option<BloomFilterPolicy>,
}

impl BlockWriter {
    /// Create a writer for one block file
    pub fn new(path: PathBuf, properties: WriterProperties) -> Self {
        Self {
            path,
            trackers: BTreeMap::new(),
            value_counts: BTreeMap::new(),
            policy: properties.policy(),
        }
    }

    /// Record one value for a column
    pub fn append(&mut self, column: &str, value: &ColumnValue) {
        let policy = self.policy;
        let tracker = self
            .trackers
            .entry(column.to_string())
            .or_insert_with(|| match policy {
                Some(policy) => UniqueValueTracker::with_policy(policy),
                None => UniqueValueTracker::new(),
            });
        tracker.add(&value.canonical_bytes());
        *self.value_counts.entry(column.to_string()).or_insert(0) += 1;
    }

    /// Close the block: materialize qualifying filters, persist them, and
    /// return the metadata that was written to the footer
    pub fn finish(mut self) -> Result<BlockMeta> {
        let mut file = BufWriter::new(File::create(&self.path)?);
        let mut offset = 0u64;

        let mut header = BytesMut::new();
        header.put_slice(MAGIC);
        header.put_u32_le(FORMAT_VERSION);
        file.write_all(&header)?;
        offset += header.len() as u64;

        let mut columns = Vec::with_capacity(self.trackers.len());
        for (column, tracker) in self.trackers.iter_mut() {
            let unique_ratio = tracker.unique_ratio() as f32;
            let bloom = match tracker.take_filter()? {
                Some(mut filter) => {
                    let bytes = filter.to_bytes();
                    filter.set_file_offset(offset);
                    filter.set_byte_length(bytes.len() as u64);
                    file.write_all(&bytes)?;
                    offset += bytes.len() as u64;
                    debug!(
                        "wrote bloom filter for column {}: offset {}, {} bytes",
                        column,
                        filter.file_offset(),
                        filter.byte_length()
                    );
                    Some(BloomFilterMeta::from_filter(&filter))
                }
                None => None,
            };

            columns.push(ColumnChunkMeta {
                column: column.clone(),
                value_count: self.value_counts.get(column).copied().unwrap_or(0),
                unique_ratio,
                bloom,
            });
        }

        let meta = BlockMeta { columns };
        let meta_offset = offset;
        file.write_all(&meta.encode()?)?;

        let mut trailer = BytesMut::new();
        trailer.put_u64_le(meta_offset);
        trailer.put_slice(MAGIC);
        file.write_all(&trailer)?;
        file.flush()?;

        Ok(meta)
    }
}
