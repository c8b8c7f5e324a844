//! Core types for Strata

use serde::{Deserialize, Serialize};

/// A typed column value with a pinned canonical byte encoding.
///
/// Filters hash the canonical encoding, never a display form: integers are
/// fixed-width little-endian, floats are the little-endian bytes of their
/// IEEE-754 bit pattern, booleans are a single 0/1 byte, and binary/string
/// values are their raw bytes. Two writers on different platforms therefore
/// produce bit-identical filters for the same values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
    /// Boolean
    Boolean(bool),
    /// Raw binary
    Bytes(Vec<u8>),
    /// UTF-8 string
    Str(String),
}

impl ColumnValue {
    /// Canonical byte encoding used for filter hashing
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            ColumnValue::Int32(v) => v.to_le_bytes().to_vec(),
            ColumnValue::Int64(v) => v.to_le_bytes().to_vec(),
            ColumnValue::Float32(v) => v.to_bits().to_le_bytes().to_vec(),
            ColumnValue::Float64(v) => v.to_bits().to_le_bytes().to_vec(),
            ColumnValue::Boolean(v) => vec![u8::from(*v)],
            ColumnValue::Bytes(b) => b.clone(),
            ColumnValue::Str(s) => s.as_bytes().to_vec(),
        }
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        match self {
            ColumnValue::Int32(_) | ColumnValue::Float32(_) => 4,
            ColumnValue::Int64(_) | ColumnValue::Float64(_) => 8,
            ColumnValue::Boolean(_) => 1,
            ColumnValue::Bytes(b) => b.len(),
            ColumnValue::Str(s) => s.len(),
        }
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int32(v)
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int64(v)
    }
}

impl From<f32> for ColumnValue {
    fn from(v: f32) -> Self {
        ColumnValue::Float32(v)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float64(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Boolean(v)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(v: Vec<u8>) -> Self {
        ColumnValue::Bytes(v)
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Str(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Str(v.to_string())
    }
}
