//! Filter parameter derivation
//!
//! A filter is described by four interdependent parameters: expected
//! elements `n`, bit vector size `m`, hash count `k`, and false positive
//! probability `p`. Callers supply either (n, p) or (m, k); the remainder
//! is derived from the standard optimal-filter relations:
//!
//! ```text
//! m = ceil(-n * ln(p) / ln(2)^2)
//! k = ceil(ln(2) * m / n)
//! n = ceil(ln(2) * m / k)
//! p = (1 - e^(-k*n/m))^k
//! ```

use super::HashStrategy;
use crate::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// Optimal bit count for `n` expected elements at false positive rate `p`
pub fn optimal_m(n: u64, p: f64) -> u64 {
    (-(n as f64) * p.ln() / (LN_2 * LN_2)).ceil() as u64
}

/// Optimal hash count for `n` expected elements over `m` bits
pub fn optimal_k(n: u64, m: u64) -> u32 {
    ((LN_2 * m as f64) / n as f64).ceil() as u32
}

/// Element count for which `k` hashes over `m` bits are optimal
pub fn optimal_n(k: u32, m: u64) -> u64 {
    ((LN_2 * m as f64) / f64::from(k)).ceil() as u64
}

/// False positive probability of `k` hashes over `m` bits after
/// `inserted_elements` insertions, assuming uniform hashing
pub fn optimal_p(k: u32, m: u64, inserted_elements: f64) -> f64 {
    (1.0 - (-f64::from(k) * inserted_elements / m as f64).exp()).powf(f64::from(k))
}

/// Partially specified filter parameters.
///
/// Setters perform no validation; [`FilterOptions::complete`] resolves the
/// missing parameters or rejects the set as insufficient.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    expected_elements: Option<u64>,
    bits: Option<u64>,
    hashes: Option<u32>,
    false_positive: Option<f64>,
    strategy: HashStrategy,
}

impl FilterOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected number of elements (n)
    pub fn expected_elements(mut self, n: u64) -> Self {
        self.expected_elements = Some(n);
        self
    }

    /// Bit vector size (m)
    pub fn bits(mut self, m: u64) -> Self {
        self.bits = Some(m);
        self
    }

    /// Number of hash positions per element (k)
    pub fn hashes(mut self, k: u32) -> Self {
        self.hashes = Some(k);
        self
    }

    /// Tolerable false positive probability (p)
    pub fn false_positive(mut self, p: f64) -> Self {
        self.false_positive = Some(p);
        self
    }

    /// Hash strategy
    pub fn strategy(mut self, strategy: HashStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Resolve the missing parameters into an immutable [`FilterConfig`].
    ///
    /// Requires at least (n, p) or (m, k). A derived or supplied `m` of
    /// zero is rejected before any allocation can happen. Completing an
    /// already fully specified set derives nothing.
    pub fn complete(self) -> Result<FilterConfig> {
        if let Some(p) = self.false_positive {
            if !(p > 0.0 && p < 1.0) {
                return Err(StrataError::InvalidParameter(format!(
                    "false positive probability {} outside (0, 1)",
                    p
                )));
            }
        }

        let mut bits = self.bits;
        let mut hashes = self.hashes;

        if bits.is_none() {
            if let (Some(n), Some(p)) = (self.expected_elements, self.false_positive) {
                bits = Some(optimal_m(n, p));
            }
        }
        if hashes.is_none() {
            if let (Some(n), Some(m)) = (self.expected_elements, bits) {
                if n > 0 {
                    hashes = Some(optimal_k(n, m));
                }
            }
        }

        let (bits, hashes) = match (bits, hashes) {
            (Some(m), Some(k)) if m > 0 && k > 0 => (m, k),
            _ => {
                return Err(StrataError::InsufficientParameters(
                    "neither (expected_elements, false_positive) nor (bits, hashes) \
                     resolve to a non-empty filter"
                        .to_string(),
                ))
            }
        };

        let expected_elements = match self.expected_elements {
            Some(n) => n,
            None => optimal_n(hashes, bits),
        };
        let false_positive = match self.false_positive {
            Some(p) => p,
            None => optimal_p(hashes, bits, expected_elements as f64),
        };

        Ok(FilterConfig {
            expected_elements,
            bits,
            hashes,
            false_positive,
            strategy: self.strategy,
        })
    }
}

/// Fully resolved filter parameters.
///
/// Immutable once built; every numeric field is populated and mutually
/// consistent under the derivation formulas of this module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    expected_elements: u64,
    bits: u64,
    hashes: u32,
    false_positive: f64,
    strategy: HashStrategy,
}

impl FilterConfig {
    /// Expected number of elements (n)
    pub fn expected_elements(&self) -> u64 {
        self.expected_elements
    }

    /// Bit vector size (m)
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of hash positions per element (k)
    pub fn hashes(&self) -> u32 {
        self.hashes
    }

    /// Tolerable false positive probability (p)
    pub fn false_positive(&self) -> f64 {
        self.false_positive
    }

    /// Hash strategy
    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    /// Size of the serialized bit vector in bytes
    pub fn byte_size(&self) -> u64 {
        (self.bits + 7) / 8
    }

    /// Positions of an element under this configuration
    pub fn positions(&self, element: &[u8]) -> Vec<u64> {
        self.strategy.positions(element, self.bits, self.hashes)
    }

    /// Whether two configurations describe interoperable filters.
    ///
    /// Compatibility requires matching bits, hashes, and strategy; the
    /// derived `expected_elements`/`false_positive` fields may differ.
    pub fn is_compatible_to(&self, other: &FilterConfig) -> bool {
        self.bits == other.bits && self.hashes == other.hashes && self.strategy == other.strategy
    }
}
