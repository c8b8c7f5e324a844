//! Per-column unique value tracking
//!
//! A tracker accumulates the distinct raw values a column sees during one
//! write block and decides at block close whether a Bloom filter pays off.
//! Sizing uses the cardinality observed at flush time rather than a static
//! estimate, so filters come out right-sized at the cost of buffering the
//! block's unique values.

use super::{BloomFilter, FilterOptions, HashStrategy};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Construction policy for column chunk filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomFilterPolicy {
    /// Tolerable false positive probability
    pub false_positive: f32,
    /// Unique/total ratio recorded alongside the chunk statistics
    pub unique_ratio_threshold: f32,
    /// Minimum total values seen before a filter is built
    pub value_count_threshold: u32,
    /// Hash strategy for filters built under this policy
    pub strategy: HashStrategy,
}

impl BloomFilterPolicy {
    /// Create a policy with the default hash strategy
    pub fn new(false_positive: f32, unique_ratio_threshold: f32, value_count_threshold: u32) -> Self {
        Self {
            false_positive,
            unique_ratio_threshold,
            value_count_threshold,
            strategy: HashStrategy::default(),
        }
    }
}

impl Default for BloomFilterPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::BLOOM_FALSE_POSITIVE,
            crate::config::BLOOM_UNIQUE_RATIO_THRESHOLD,
            crate::config::BLOOM_VALUE_COUNT_THRESHOLD,
        )
    }
}

/// Accumulator of one column's distinct values for one write block.
///
/// Tracking happens only while a policy is attached; without one, `add` is
/// a no-op and the tracker carries no overhead. The total insertion count,
/// not the distinct count, gates filter eligibility. The accumulated state
/// resets after every emission attempt, successful or not.
#[derive(Debug, Default)]
pub struct UniqueValueTracker {
    policy: Option<BloomFilterPolicy>,
    unique_values: HashSet<Vec<u8>>,
    inserted: u64,
}

impl UniqueValueTracker {
    /// Create a tracker with no policy: accumulation disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker governed by `policy`
    pub fn with_policy(policy: BloomFilterPolicy) -> Self {
        Self {
            policy: Some(policy),
            unique_values: HashSet::new(),
            inserted: 0,
        }
    }

    /// Attach a policy, enabling accumulation
    pub fn set_policy(&mut self, policy: BloomFilterPolicy) {
        self.policy = Some(policy);
    }

    /// The attached policy, if any
    pub fn policy(&self) -> Option<&BloomFilterPolicy> {
        self.policy.as_ref()
    }

    /// Record one value's canonical bytes
    pub fn add(&mut self, value: &[u8]) {
        if self.policy.is_none() {
            return;
        }
        if !self.unique_values.contains(value) {
            self.unique_values.insert(value.to_vec());
        }
        self.inserted += 1;
    }

    /// Total values recorded in this block
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    /// Distinct values recorded in this block
    pub fn unique_len(&self) -> usize {
        self.unique_values.len()
    }

    /// Distinct/total ratio of the current block; zero before any insert
    pub fn unique_ratio(&self) -> f64 {
        if self.inserted == 0 {
            return 0.0;
        }
        self.unique_values.len() as f64 / self.inserted as f64
    }

    /// Build a filter from the accumulated values if the block qualifies.
    ///
    /// Returns `None` when no policy is attached, nothing was inserted, or
    /// the total count is below the policy threshold. Otherwise the filter
    /// is sized for the observed unique count at the policy's false
    /// positive rate and populated with every distinct value. The tracker
    /// resets either way.
    pub fn take_filter(&mut self) -> Result<Option<BloomFilter>> {
        let Some(policy) = self.policy else {
            self.reset();
            return Ok(None);
        };

        if self.inserted == 0 || self.inserted < u64::from(policy.value_count_threshold) {
            self.reset();
            return Ok(None);
        }

        let config = FilterOptions::new()
            .expected_elements(self.unique_values.len() as u64)
            .false_positive(f64::from(policy.false_positive))
            .strategy(policy.strategy)
            .complete();
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        debug!(
            "emitting bloom filter: {} unique elements, {} false positive",
            self.unique_values.len(),
            policy.false_positive
        );

        let filter = BloomFilter::new(config);
        for value in &self.unique_values {
            filter.add(value);
        }
        self.reset();
        Ok(Some(filter))
    }

    /// Discard the accumulated values and counter
    pub fn reset(&mut self) {
        self.unique_values.clear();
        self.inserted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(count_threshold: u32) -> BloomFilterPolicy {
        BloomFilterPolicy::new(0.01, 0.2, count_threshold)
    }

    #[test]
    fn test_no_policy_means_no_accumulation() {
        let mut tracker = UniqueValueTracker::new();
        tracker.add(b"value");
        tracker.add(b"value2");
        assert_eq!(tracker.inserted(), 0);
        assert_eq!(tracker.unique_len(), 0);
        assert!(tracker.take_filter().unwrap().is_none());
    }

    #[test]
    fn test_count_threshold_gates_emission() {
        let mut tracker = UniqueValueTracker::with_policy(policy(20));
        for i in 0..19u32 {
            tracker.add(&i.to_le_bytes());
        }
        assert!(tracker.take_filter().unwrap().is_none());

        // The attempt reset the tracker: start over and cross the gate.
        for i in 0..20u32 {
            tracker.add(&i.to_le_bytes());
        }
        let filter = tracker.take_filter().unwrap().expect("filter emitted");
        for i in 0..20u32 {
            assert!(filter.contains(&i.to_le_bytes()));
        }
    }

    #[test]
    fn test_total_count_gates_not_distinct_count() {
        // 25 insertions of 5 distinct values crosses a threshold of 20.
        let mut tracker = UniqueValueTracker::with_policy(policy(20));
        for i in 0..25u32 {
            tracker.add(&(i % 5).to_le_bytes());
        }
        assert_eq!(tracker.inserted(), 25);
        assert_eq!(tracker.unique_len(), 5);

        let filter = tracker.take_filter().unwrap().expect("filter emitted");
        assert_eq!(filter.config().expected_elements(), 5);
    }

    #[test]
    fn test_filter_sized_from_observed_cardinality() {
        let mut tracker = UniqueValueTracker::with_policy(policy(1));
        for i in 0..1000u32 {
            tracker.add(&(i % 100).to_le_bytes());
        }
        let filter = tracker.take_filter().unwrap().expect("filter emitted");
        assert_eq!(filter.config().expected_elements(), 100);
        assert_eq!(
            filter.config().bits(),
            crate::bloom::optimal_m(100, 0.01f32 as f64)
        );
    }

    #[test]
    fn test_reset_after_every_attempt() {
        let mut tracker = UniqueValueTracker::with_policy(policy(1));
        tracker.add(b"a");
        assert!(tracker.take_filter().unwrap().is_some());
        assert_eq!(tracker.inserted(), 0);
        assert_eq!(tracker.unique_len(), 0);

        // A fresh block below the gate also resets.
        let mut gated = UniqueValueTracker::with_policy(policy(100));
        gated.add(b"a");
        assert!(gated.take_filter().unwrap().is_none());
        assert_eq!(gated.inserted(), 0);
        assert_eq!(gated.unique_len(), 0);
    }

    #[test]
    fn test_unique_ratio() {
        let mut tracker = UniqueValueTracker::with_policy(policy(1));
        assert_eq!(tracker.unique_ratio(), 0.0);
        for i in 0..10u32 {
            tracker.add(&(i % 5).to_le_bytes());
        }
        assert!((tracker.unique_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_policy_attach_enables_accumulation() {
        let mut tracker = UniqueValueTracker::new();
        tracker.add(b"before");
        assert_eq!(tracker.inserted(), 0);

        tracker.set_policy(policy(1));
        assert!(tracker.policy().is_some());
        tracker.add(b"after");
        assert_eq!(tracker.inserted(), 1);
        assert!(tracker.take_filter().unwrap().is_some());
    }

    #[test]
    fn test_empty_tracker_emits_nothing() {
        let mut tracker = UniqueValueTracker::with_policy(policy(0));
        assert!(tracker.take_filter().unwrap().is_none());
    }
}
