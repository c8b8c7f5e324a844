//! Block reader: shell reconstruction and lazy filter loading

use super::{BlockMeta, FORMAT_VERSION, MAGIC};
use crate::bloom::{BitVector, BloomFilter};
use crate::{ColumnValue, Result, StrataError};
use bytes::Buf;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::debug;

/// Trailer: metadata offset (8 bytes) + magic (4 bytes)
const TRAILER_LEN: u64 = 12;

struct FilterSlot {
    filter: BloomFilter,
    loaded: bool,
}

/// Reads one block's membership indexes.
///
/// Opening a block parses and checksums the metadata footer and builds a
/// *shell* filter for every column that persisted one: parameters resolved,
/// bits absent. A shell's bits are loaded on first use with a seek to the
/// recorded offset and a read of exactly `byte_length` bytes.
pub struct BlockReader {
    path: PathBuf,
    meta: BlockMeta,
    filters: BTreeMap<String, FilterSlot>,
}

impl BlockReader {
    /// Open a block file and parse its metadata footer
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut file = File::open(&path)?;
        let file_size = file.metadata()?.len();
        if file_size < 8 + TRAILER_LEN {
            return Err(StrataError::InvalidFormat("block file too short".into()));
        }

        let mut header = [0u8; 8];
        file.read_exact(&mut header)?;
        if &header[..4] != MAGIC {
            return Err(StrataError::InvalidFormat("invalid block header magic".into()));
        }
        let mut cursor = std::io::Cursor::new(&header[4..]);
        let version = cursor.get_u32_le();
        if version != FORMAT_VERSION {
            return Err(StrataError::InvalidFormat(format!(
                "unsupported block format version: {}",
                version
            )));
        }

        file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))?;
        let mut trailer = [0u8; TRAILER_LEN as usize];
        file.read_exact(&mut trailer)?;
        if &trailer[8..] != MAGIC {
            return Err(StrataError::InvalidFormat("invalid block trailer magic".into()));
        }
        let mut cursor = std::io::Cursor::new(&trailer[..8]);
        let meta_offset = cursor.get_u64_le();
        if meta_offset >= file_size - TRAILER_LEN {
            return Err(StrataError::InvalidFormat("metadata offset out of bounds".into()));
        }

        file.seek(SeekFrom::Start(meta_offset))?;
        let frame_len = (file_size - TRAILER_LEN - meta_offset) as usize;
        let mut frame = vec![0u8; frame_len];
        file.read_exact(&mut frame)?;
        let meta = BlockMeta::decode(&frame)?;

        let mut filters = BTreeMap::new();
        for chunk in &meta.columns {
            if let Some(bloom) = &chunk.bloom {
                let config = bloom.to_config()?;
                let filter = BloomFilter::shell(config, bloom.file_offset, bloom.byte_length);
                filters.insert(
                    chunk.column.clone(),
                    FilterSlot {
                        filter,
                        loaded: false,
                    },
                );
            }
        }

        Ok(Self {
            path,
            meta,
            filters,
        })
    }

    /// Block metadata parsed from the footer
    pub fn meta(&self) -> &BlockMeta {
        &self.meta
    }

    /// Whether a column persisted a filter
    pub fn has_filter(&self, column: &str) -> bool {
        self.filters.contains_key(column)
    }

    /// The column's filter with bits resident, loading them on first use.
    ///
    /// Returns `None` for columns without a persisted filter. Loading
    /// seeks to the recorded offset and reads exactly `byte_length` bytes;
    /// a length that disagrees with the configured bit count fails decode.
    pub fn load_filter(&mut self, column: &str) -> Result<Option<&BloomFilter>> {
        let Some(slot) = self.filters.get_mut(column) else {
            return Ok(None);
        };

        if !slot.loaded {
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(slot.filter.file_offset()))?;
            let mut data = vec![0u8; slot.filter.byte_length() as usize];
            file.read_exact(&mut data)?;
            slot.filter
                .set_bits(BitVector::from_bytes(&data, slot.filter.config().bits())?);
            slot.loaded = true;
            debug!(
                "loaded bloom filter for column {}: offset {}, {} bytes",
                column,
                slot.filter.file_offset(),
                slot.filter.byte_length()
            );
        }

        Ok(Some(&slot.filter))
    }

    /// Whether the column chunk may contain the value.
    ///
    /// False licenses skipping the chunk; true only means "possibly
    /// present". Columns without a filter can never be ruled out.
    pub fn may_contain(&mut self, column: &str, value: &ColumnValue) -> Result<bool> {
        match self.load_filter(column)? {
            Some(filter) => Ok(filter.contains(&value.canonical_bytes())),
            None => Ok(true),
        }
    }
}
