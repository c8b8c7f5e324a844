//! Hash strategies for filter position derivation

use crate::{Result, StrataError};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Seed of the first base hash
const SEED_PRIMARY: u64 = 0x9747_b28c;

/// Seed of the second base hash
const SEED_SECONDARY: u64 = 0x5bd1_e995;

/// Strategy mapping an element's bytes to k positions in `[0, bits)`.
///
/// The strategy is a pure function of the element bytes and (bits, hashes):
/// the same input always yields the same positions, across runs and across
/// processes. The identity of the strategy is persisted in block metadata
/// as a one-byte id so readers reconstruct the exact same mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashStrategy {
    /// Double hashing over two seeded xxh3-64 hashes: `(h1 + i*h2) mod bits`
    #[default]
    XxDouble,
}

impl HashStrategy {
    /// Persisted strategy id
    pub const fn id(&self) -> u8 {
        match self {
            HashStrategy::XxDouble => 0,
        }
    }

    /// Resolve a persisted strategy id
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(HashStrategy::XxDouble),
            other => Err(StrataError::UnknownHashStrategy(other)),
        }
    }

    /// Compute the `hashes` positions of an element, each in `[0, bits)`.
    ///
    /// The two base hashes are computed once; the i-th position is derived
    /// as `(h1 + i*h2) mod bits` with wrapping arithmetic.
    pub fn positions(&self, element: &[u8], bits: u64, hashes: u32) -> Vec<u64> {
        debug_assert!(bits > 0);
        match self {
            HashStrategy::XxDouble => {
                let h1 = xxh3_64_with_seed(element, SEED_PRIMARY);
                let h2 = xxh3_64_with_seed(element, SEED_SECONDARY);
                (0..u64::from(hashes))
                    .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % bits)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_in_range() {
        let strategy = HashStrategy::XxDouble;
        for element in [&b"test0"[..], b"", b"\x00\x01\x02"] {
            let positions = strategy.positions(element, 97, 7);
            assert_eq!(positions.len(), 7);
            assert!(positions.iter().all(|&p| p < 97));
        }
    }

    #[test]
    fn test_positions_deterministic() {
        let strategy = HashStrategy::XxDouble;
        let a = strategy.positions(b"some-element", 1 << 20, 5);
        let b = strategy.positions(b"some-element", 1 << 20, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_elements_disperse() {
        let strategy = HashStrategy::XxDouble;
        let a = strategy.positions(b"element-a", 1 << 20, 5);
        let b = strategy.positions(b"element-b", 1 << 20, 5);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_id_rejected() {
        assert_eq!(HashStrategy::from_id(0).unwrap(), HashStrategy::XxDouble);
        assert!(HashStrategy::from_id(200).is_err());
    }
}
