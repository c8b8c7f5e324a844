//! Predicate pruning over block metadata
//!
//! A typed predicate tree drives two decisions:
//! - which column chunks' statistics must be fetched from storage for a
//!   given expression ([`columns_to_fetch`])
//! - whether a whole block can be skipped because a filter proves definite
//!   non-membership ([`can_drop_block`])
//!
//! Only equality consults a filter: a Bloom filter keyed by value hash
//! carries no range-membership guarantee, so every other comparison must
//! scan. `NOT` is expected to have been rewritten away before pruning.

use crate::chunk::{BlockMeta, BlockReader, ColumnChunkMeta};
use crate::{ColumnValue, Result};

/// A filter expression over column values
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// column == value
    Eq(String, ColumnValue),
    /// column != value
    NotEq(String, ColumnValue),
    /// column < value
    Lt(String, ColumnValue),
    /// column <= value
    LtEq(String, ColumnValue),
    /// column > value
    Gt(String, ColumnValue),
    /// column >= value
    GtEq(String, ColumnValue),
    /// Both sides must hold
    And(Box<Predicate>, Box<Predicate>),
    /// Either side must hold
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// column == value
    pub fn eq(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Predicate::Eq(column.into(), value.into())
    }

    /// column != value
    pub fn not_eq(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Predicate::NotEq(column.into(), value.into())
    }

    /// column < value
    pub fn lt(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Predicate::Lt(column.into(), value.into())
    }

    /// column > value
    pub fn gt(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Predicate::Gt(column.into(), value.into())
    }

    /// Conjunction
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Disjunction
    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }
}

/// Collect the column chunks whose statistics must be fetched to evaluate
/// `predicate` over `blocks`.
///
/// Equality contributes every chunk of its column; other comparisons
/// contribute nothing (no filter can serve them); conjunction and
/// disjunction merge both sides. Duplicates are kept, mirroring the
/// per-occurrence fetch the evaluation performs.
pub fn columns_to_fetch<'a>(
    predicate: &Predicate,
    blocks: &'a [BlockMeta],
) -> Vec<&'a ColumnChunkMeta> {
    match predicate {
        Predicate::Eq(column, _) => blocks
            .iter()
            .flat_map(|block| block.columns.iter().filter(|c| &c.column == column))
            .collect(),
        Predicate::NotEq(..)
        | Predicate::Lt(..)
        | Predicate::LtEq(..)
        | Predicate::Gt(..)
        | Predicate::GtEq(..) => Vec::new(),
        Predicate::And(left, right) | Predicate::Or(left, right) => {
            let mut merge = columns_to_fetch(left, blocks);
            merge.extend(columns_to_fetch(right, blocks));
            merge
        }
    }
}

/// Whether the block can be skipped for `predicate`.
///
/// True only on definite non-membership: an equality whose column filter
/// answers "not present". A `true` from a filter never licenses skipping
/// (it only means "possibly present"), range comparisons never consult
/// filters, and columns without a filter cannot be ruled out. A
/// conjunction drops when either side drops; a disjunction only when both
/// sides do.
pub fn can_drop_block(predicate: &Predicate, reader: &mut BlockReader) -> Result<bool> {
    match predicate {
        Predicate::Eq(column, value) => Ok(!reader.may_contain(column, value)?),
        Predicate::NotEq(..)
        | Predicate::Lt(..)
        | Predicate::LtEq(..)
        | Predicate::Gt(..)
        | Predicate::GtEq(..) => Ok(false),
        Predicate::And(left, right) => {
            Ok(can_drop_block(left, reader)? || can_drop_block(right, reader)?)
        }
        Predicate::Or(left, right) => {
            Ok(can_drop_block(left, reader)? && can_drop_block(right, reader)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{BlockWriter, WriterProperties};
    use tempfile::tempdir;

    fn sample_blocks() -> Vec<BlockMeta> {
        let chunk = |column: &str| ColumnChunkMeta {
            column: column.to_string(),
            value_count: 100,
            unique_ratio: 1.0,
            bloom: None,
        };
        vec![
            BlockMeta {
                columns: vec![chunk("id"), chunk("name")],
            },
            BlockMeta {
                columns: vec![chunk("id"), chunk("name")],
            },
        ]
    }

    #[test]
    fn test_eq_fetches_its_column_chunks() {
        let blocks = sample_blocks();
        let fetched = columns_to_fetch(&Predicate::eq("id", 1i64), &blocks);
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|c| c.column == "id"));
    }

    #[test]
    fn test_range_comparisons_fetch_nothing() {
        let blocks = sample_blocks();
        for predicate in [
            Predicate::not_eq("id", 1i64),
            Predicate::lt("id", 1i64),
            Predicate::gt("id", 1i64),
            Predicate::LtEq("id".into(), 1i64.into()),
            Predicate::GtEq("id".into(), 1i64.into()),
        ] {
            assert!(columns_to_fetch(&predicate, &blocks).is_empty());
        }
    }

    #[test]
    fn test_and_or_merge_both_sides() {
        let blocks = sample_blocks();
        let predicate = Predicate::eq("id", 1i64).and(Predicate::eq("name", "alice"));
        let fetched = columns_to_fetch(&predicate, &blocks);
        assert_eq!(fetched.len(), 4);

        let predicate = Predicate::eq("id", 1i64).or(Predicate::lt("name", "alice"));
        let fetched = columns_to_fetch(&predicate, &blocks);
        assert_eq!(fetched.len(), 2);
    }

    fn written_block(dir: &std::path::Path) -> BlockReader {
        let path = dir.join("block");
        let mut writer = BlockWriter::new(path.clone(), WriterProperties::default());
        for i in 0..1000i64 {
            writer.append("id", &ColumnValue::Int64(i));
        }
        writer.finish().unwrap();
        BlockReader::open(path).unwrap()
    }

    #[test]
    fn test_equality_drops_on_definite_absence() {
        let dir = tempdir().unwrap();
        let mut reader = written_block(dir.path());

        // Present values never drop.
        assert!(!can_drop_block(&Predicate::eq("id", 500i64), &mut reader).unwrap());
        // A value far outside the inserted set almost surely drops; scan a
        // few candidates so one filter collision cannot flake the test.
        let dropped = (0..20)
            .any(|i| can_drop_block(&Predicate::eq("id", 1_000_000i64 + i), &mut reader).unwrap());
        assert!(dropped);
    }

    #[test]
    fn test_range_and_filterless_columns_never_drop() {
        let dir = tempdir().unwrap();
        let mut reader = written_block(dir.path());

        assert!(!can_drop_block(&Predicate::lt("id", -1i64), &mut reader).unwrap());
        assert!(!can_drop_block(&Predicate::not_eq("id", 1i64), &mut reader).unwrap());
        assert!(!can_drop_block(&Predicate::eq("unindexed", 1i64), &mut reader).unwrap());
    }

    #[test]
    fn test_conjunction_disjunction_drop_rules() {
        let dir = tempdir().unwrap();
        let mut reader = written_block(dir.path());

        let present = Predicate::eq("id", 1i64);
        let absent = (0..20)
            .map(|i| Predicate::eq("id", 1_000_000i64 + i))
            .find(|p| can_drop_block(p, &mut reader).unwrap())
            .expect("an absent probe value");

        // And drops if either side drops; Or needs both.
        assert!(can_drop_block(&present.clone().and(absent.clone()), &mut reader).unwrap());
        assert!(!can_drop_block(&present.clone().or(absent.clone()), &mut reader).unwrap());
        assert!(can_drop_block(&absent.clone().and(absent.clone()), &mut reader).unwrap());
        assert!(can_drop_block(&absent.clone().or(absent), &mut reader).unwrap());
    }
}
