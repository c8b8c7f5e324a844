//! Bloom filter over a configured bit vector

use super::{optimal_p, BitVector, FilterConfig};
use parking_lot::RwLock;

/// A Bloom filter attached to one column chunk.
///
/// Composes a resolved [`FilterConfig`] with a bit vector and the file
/// linkage of the serialized bits: `file_offset` and `byte_length` describe
/// where the vector lives inside the enclosing block file. A filter is
/// either *materialized* (bits resident, safe to query) or a *shell*
/// (parameters known, bits installed later by a reader via
/// [`BloomFilter::set_bits`]). The filter itself performs no I/O.
///
/// `contains` is safe under concurrent readers; mutations (`add`, `union`,
/// `intersect`, `clear`, `set_bits`) take the exclusive guard for the
/// duration of the whole-vector update.
#[derive(Debug)]
pub struct BloomFilter {
    config: FilterConfig,
    bits: RwLock<BitVector>,
    file_offset: u64,
    byte_length: u64,
}

impl BloomFilter {
    /// Create a materialized filter with a zeroed bit vector
    pub fn new(config: FilterConfig) -> Self {
        let byte_length = config.byte_size();
        Self {
            config,
            bits: RwLock::new(BitVector::new(config.bits())),
            file_offset: 0,
            byte_length,
        }
    }

    /// Create a shell whose bits live at `(file_offset, byte_length)` in
    /// the enclosing file and are not yet resident
    pub fn shell(config: FilterConfig, file_offset: u64, byte_length: u64) -> Self {
        Self {
            config,
            bits: RwLock::new(BitVector::unloaded()),
            file_offset,
            byte_length,
        }
    }

    /// Filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Add an element's canonical bytes to the filter.
    ///
    /// Returns true iff at least one position was previously unset. A
    /// false return is not a membership guarantee: unrelated elements may
    /// have set all k positions.
    pub fn add(&self, element: &[u8]) -> bool {
        let positions = self.config.positions(element);
        let mut bits = self.bits.write();
        let mut added = false;
        for &position in &positions {
            if !bits.get(position) {
                bits.set(position, true);
                added = true;
            }
        }
        added
    }

    /// Test an element's canonical bytes for membership.
    ///
    /// True iff all k positions are set: false positives occur at a rate
    /// approaching the configured probability as occupancy grows, false
    /// negatives never. A shell whose bits are not resident answers false.
    pub fn contains(&self, element: &[u8]) -> bool {
        let positions = self.config.positions(element);
        let bits = self.bits.read();
        positions.iter().all(|&position| bits.get(position))
    }

    /// Bitwise-OR another filter into this one.
    ///
    /// Returns false without mutating unless the configurations are
    /// compatible and both bit vectors are resident with equal length.
    /// Lossless: the result is the filter that direct insertion of both
    /// element sets would have produced.
    pub fn union(&self, other: &BloomFilter) -> bool {
        if !self.config.is_compatible_to(other.config()) {
            return false;
        }
        let theirs = other.bits.read().clone();
        let mut mine = self.bits.write();
        if mine.len() != theirs.len() {
            return false;
        }
        mine.or(&theirs);
        true
    }

    /// Bitwise-AND another filter into this one.
    ///
    /// Returns false without mutating unless the configurations are
    /// compatible and both bit vectors are resident with equal length.
    /// Raises the effective false positive rate but introduces no false
    /// negatives for elements present in both source sets.
    pub fn intersect(&self, other: &BloomFilter) -> bool {
        if !self.config.is_compatible_to(other.config()) {
            return false;
        }
        let theirs = other.bits.read().clone();
        let mut mine = self.bits.write();
        if mine.len() != theirs.len() {
            return false;
        }
        mine.and(&theirs);
        true
    }

    /// Reset every bit to zero
    pub fn clear(&self) {
        self.bits.write().clear();
    }

    /// Whether no element has been added
    pub fn is_empty(&self) -> bool {
        self.bits.read().is_empty()
    }

    /// Number of set bits
    pub fn cardinality(&self) -> u64 {
        self.bits.read().cardinality()
    }

    /// Serialized bit vector: exactly `ceil(bits / 8)` bytes, no header
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.read().to_bytes()
    }

    /// Install a bit vector decoded by a reader.
    ///
    /// Must be called with a vector of the configured length before any
    /// `contains` call on a shell.
    pub fn set_bits(&self, bits: BitVector) {
        *self.bits.write() = bits;
    }

    /// Whether the bit vector is resident (materialized) rather than a
    /// pending shell
    pub fn is_materialized(&self) -> bool {
        self.bits.read().len() == self.config.bits()
    }

    /// Estimate the number of distinct elements inserted so far:
    /// `-m/k * ln(1 - ones/m)`
    pub fn estimated_population(&self) -> f64 {
        let ones = self.cardinality() as f64;
        let m = self.config.bits() as f64;
        let k = f64::from(self.config.hashes());
        -m / k * (1.0 - ones / m).ln()
    }

    /// False positive probability after `inserted_elements` insertions
    pub fn false_positive_probability(&self, inserted_elements: f64) -> f64 {
        optimal_p(self.config.hashes(), self.config.bits(), inserted_elements)
    }

    /// False positive probability at the estimated current population
    pub fn estimated_false_positive_probability(&self) -> f64 {
        self.false_positive_probability(self.estimated_population())
    }

    /// Offset of the serialized bit vector in the enclosing file
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Record where the writer placed the serialized bit vector
    pub fn set_file_offset(&mut self, offset: u64) {
        self.file_offset = offset;
    }

    /// Length in bytes of the serialized bit vector
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// Record the serialized bit vector length
    pub fn set_byte_length(&mut self, length: u64) {
        self.byte_length = length;
    }
}

impl Clone for BloomFilter {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            bits: RwLock::new(self.bits.read().clone()),
            file_offset: self.file_offset,
            byte_length: self.byte_length,
        }
    }
}

impl PartialEq for BloomFilter {
    /// Filters are equal iff their bit vectors are bit-identical and their
    /// configurations are compatible; derived parameter fields may differ.
    fn eq(&self, other: &Self) -> bool {
        self.config.is_compatible_to(other.config()) && *self.bits.read() == *other.bits.read()
    }
}
