//! Compressed set of 48-bit values.
//!
//! A [`CompressedSet`] decomposes each value into a 16-bit bucket key and a
//! 32-bit low value, routing the low value to the bucket's container. The
//! sorted [`BucketIndex`] is the entire state; cardinality is the sum of
//! the per-container counters.
//!
//! The structure is single-writer and unsynchronized: at most one mutator
//! may be active at a time, and reads concurrent with a mutation are
//! undefined. Callers needing concurrency wrap each instance externally
//! (see [`crate::registry`]). No operation blocks or performs I/O.

use crate::{
    bits,
    container::{self, Container, CONVERSION_THRESHOLD},
    index::{BucketIndex, Entry},
};
use core::fmt::{self, Formatter};

/// A compressed set of unsigned integers in `[0, 2^48)`.
///
/// Values outside the domain are a caller contract breach, checked only in
/// debug mode.
///
/// # Example
///
/// ```
/// use roaring48::CompressedSet;
///
/// let mut set = CompressedSet::new();
/// set.add(10);
/// set.add(1_474_976_710_656);
///
/// assert!(set.contains(10));
/// assert!(!set.contains(11));
/// assert_eq!(set.cardinality(), 2);
/// ```
#[derive(Clone)]
pub struct CompressedSet {
    /// Buckets keyed by the high 16 bits of the values they contain.
    index: BucketIndex,
    /// Cardinality at which a bucket switches representation.
    threshold: usize,
}

impl CompressedSet {
    /// Creates an empty set with the default conversion threshold.
    pub fn new() -> Self {
        Self::with_threshold(CONVERSION_THRESHOLD)
    }

    /// Creates an empty set with a custom conversion threshold.
    ///
    /// Exposed so deployments (and tests) can tune the sparse/dense
    /// boundary; the dense representation's footprint is fixed regardless.
    pub fn with_threshold(threshold: usize) -> Self {
        debug_assert!(threshold > 0);
        Self {
            index: BucketIndex::new(),
            threshold,
        }
    }

    /// Adds a value.
    ///
    /// Returns `true` if the value was newly added; adding a present value
    /// is a no-op.
    pub fn add(&mut self, value: u64) -> bool {
        debug_assert!(value <= bits::MAX_VALUE, "value out of 48-bit domain");
        let key = bits::high_bits(value);
        let low = bits::low_bits(value);
        match self.index.find(key) {
            Ok(pos) => self.index.container_at_mut(pos).insert(low, self.threshold),
            Err(pos) => {
                // Buckets are created lazily, always sparse.
                let mut container = Container::new();
                container.insert(low, self.threshold);
                self.index.insert_at(pos, key, container);
                true
            }
        }
    }

    /// Checks if a value is present.
    pub fn contains(&self, value: u64) -> bool {
        debug_assert!(value <= bits::MAX_VALUE, "value out of 48-bit domain");
        let key = bits::high_bits(value);
        let low = bits::low_bits(value);
        self.index
            .get(key)
            .is_some_and(|container| container.contains(low))
    }

    /// Removes a value.
    ///
    /// Returns `true` if the value was present; removing an absent value is
    /// a no-op. A bucket emptied by the removal is evicted from the index,
    /// the only path that shrinks the key set.
    pub fn remove(&mut self, value: u64) -> bool {
        debug_assert!(value <= bits::MAX_VALUE, "value out of 48-bit domain");
        let key = bits::high_bits(value);
        let low = bits::low_bits(value);
        let Ok(pos) = self.index.find(key) else {
            return false;
        };
        let removed = self.index.container_at_mut(pos).remove(low, self.threshold);
        if removed && self.index.container_at(pos).is_empty() {
            self.index.remove_at(pos);
        }
        removed
    }

    /// Returns the exact number of members.
    ///
    /// Sums the per-container counters, O(active buckets); nothing is
    /// cached across calls.
    pub fn cardinality(&self) -> u64 {
        self.index
            .entries()
            .iter()
            .map(|entry| entry.container.len() as u64)
            .sum()
    }

    /// Returns whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the number of active buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.index.len()
    }

    /// Removes all members.
    #[inline]
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Approximate in-memory footprint in bytes.
    ///
    /// An estimate, not an exact figure and not a serialization length: a
    /// fixed base plus a small per-bucket overhead plus each container's
    /// own estimate.
    pub fn size_estimate_bytes(&self) -> usize {
        let mut size = 8;
        for entry in self.index.entries() {
            size += 2 + entry.container.size_bytes();
        }
        size
    }

    /// Returns an iterator over the members in ascending order.
    ///
    /// The iterator is lazy, finite, and restartable: each call starts a
    /// fresh pass. It borrows the set immutably; removal during iteration
    /// goes through [`remove`](Self::remove) on a subsequent pass.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            entries: self.index.entries(),
            next_entry: 0,
            current: None,
        }
    }

    #[cfg(test)]
    fn bucket_is_dense(&self, key: u16) -> bool {
        self.index
            .get(key)
            .is_some_and(|container| container.is_dense())
    }
}

impl Default for CompressedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompressedSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompressedSet {{ cardinality: {}, buckets: {} }}",
            self.cardinality(),
            self.bucket_count()
        )
    }
}

/// Iterator over the values of a [`CompressedSet`].
pub struct Iter<'a> {
    entries: &'a [Entry],
    next_entry: usize,
    current: Option<(u16, container::Iter<'a>)>,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, iter)) = &mut self.current {
                if let Some(low) = iter.next() {
                    return Some(bits::combine(*key, low));
                }
            }

            let entry = self.entries.get(self.next_entry)?;
            self.current = Some((entry.key, entry.container.iter()));
            self.next_entry += 1;
        }
    }
}

impl<'a> IntoIterator for &'a CompressedSet {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u64> for CompressedSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl Extend<u64> for CompressedSet {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_new_and_empty() {
        let set = CompressedSet::new();
        assert!(set.is_empty());
        assert_eq!(set.cardinality(), 0);
        assert_eq!(set.bucket_count(), 0);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn test_add_and_contains() {
        let mut set = CompressedSet::new();

        assert!(set.add(42));
        assert!(set.add(100));
        assert!(set.add(1 << 40));
        assert!(!set.add(42)); // Duplicate

        assert_eq!(set.cardinality(), 3);
        assert!(set.contains(42));
        assert!(set.contains(100));
        assert!(set.contains(1 << 40));
        assert!(!set.contains(50));
    }

    #[test]
    fn test_remove_and_eviction() {
        let mut set = CompressedSet::new();
        set.add(10);
        set.add(20);
        set.add((5 << 32) | 7);

        assert_eq!(set.bucket_count(), 2);

        assert!(set.remove(20));
        assert!(!set.remove(20)); // Absent: no-op
        assert_eq!(set.cardinality(), 2);
        assert_eq!(set.bucket_count(), 2); // Bucket 0 still holds 10

        // Emptying a bucket evicts it from the index.
        assert!(set.remove((5 << 32) | 7));
        assert_eq!(set.bucket_count(), 1);
        assert!(!set.iter().any(|v| v >> 32 == 5));
    }

    #[test]
    fn test_add_remove_restores_cardinality() {
        let mut set = CompressedSet::new();
        set.add(1);
        set.add(2);
        let before = set.cardinality();

        set.add(99);
        set.remove(99);
        assert_eq!(set.cardinality(), before);
        assert!(!set.contains(99));
    }

    #[test]
    fn test_ordering() {
        let mut set = CompressedSet::new();
        for value in [5u64, 1 << 33, 10, (1 << 33) + 1, 3, bits::MAX_VALUE] {
            set.add(value);
        }

        let values: Vec<_> = set.iter().collect();
        assert_eq!(values, vec![3, 5, 10, 1 << 33, (1 << 33) + 1, bits::MAX_VALUE]);
        assert_eq!(values.len() as u64, set.cardinality());

        // Restartable: a second pass yields the same sequence.
        let again: Vec<_> = set.iter().collect();
        assert_eq!(again, values);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut set = CompressedSet::new();
        set.add(1);
        set.add(2);

        let mut copy = set.clone();
        copy.add(3);
        copy.remove(1);

        assert!(set.contains(1));
        assert!(!set.contains(3));
        assert_eq!(set.cardinality(), 2);
        assert_eq!(copy.cardinality(), 2);
    }

    #[test]
    fn test_clear() {
        let mut set = CompressedSet::new();
        set.extend([1u64, 2, 3, 1 << 40]);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.bucket_count(), 0);
    }

    #[test]
    fn test_from_iterator() {
        let set: CompressedSet = [100u64, 50, 200, 50, 75].into_iter().collect();
        assert_eq!(set.cardinality(), 4); // 50 is duplicate
        assert!(set.contains(75));
    }

    #[test]
    fn test_size_estimate() {
        let mut set = CompressedSet::new();
        let empty = set.size_estimate_bytes();

        set.add(1);
        set.add(2);
        assert!(set.size_estimate_bytes() > empty);
    }

    #[test]
    fn test_scenario_single_value() {
        let mut set = CompressedSet::new();
        set.add(1_474_976_710_656);
        assert!(set.contains(1_474_976_710_656));
        assert!(!set.contains(1_474_976_710_657));
    }

    #[test]
    fn test_scenario_consecutive_run() {
        let base = 1_474_976_710_656u64;
        let mut set = CompressedSet::new();
        set.add(base);
        for i in 1..=100_000u64 {
            set.add(base + i);
        }

        assert!(set.contains(1_474_976_710_756));
        assert!(!set.contains(1_574_976_710_657));
        assert_eq!(set.cardinality(), 100_001);

        // The run crossed the conversion threshold inside one bucket.
        assert_eq!(set.bucket_count(), 1);
        assert!(set.bucket_is_dense(bits::high_bits(base)));
    }

    #[test]
    fn test_scenario_add_remove_leaves_no_bucket() {
        let mut set = CompressedSet::new();
        set.add(1_474_976_710_656);
        set.remove(1_474_976_710_656);

        assert_eq!(set.cardinality(), 0);
        assert_eq!(set.bucket_count(), 0);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn test_scenario_threshold_crossing() {
        let base = 7u64 << 32;
        let mut set = CompressedSet::new();

        for i in 0..CONVERSION_THRESHOLD as u64 {
            set.add(base + i);
        }
        assert!(!set.bucket_is_dense(7));

        // One more value in the same bucket triggers the conversion.
        set.add(base + CONVERSION_THRESHOLD as u64);
        assert!(set.bucket_is_dense(7));
        assert_eq!(set.cardinality(), CONVERSION_THRESHOLD as u64 + 1);

        for i in 0..=CONVERSION_THRESHOLD as u64 {
            assert!(set.contains(base + i), "missing value {}", base + i);
        }
    }

    #[test]
    fn test_representation_transparency() {
        // Hover around a small threshold in both directions; observable
        // behavior must not depend on the active representation.
        let threshold = 4;
        let mut set = CompressedSet::with_threshold(threshold);

        for i in 0..=threshold as u64 {
            set.add(i);
        }
        assert!(set.bucket_is_dense(0));
        assert_eq!(set.cardinality(), threshold as u64 + 1);

        set.remove(0); // 5 -> 4, stays dense
        set.remove(1); // at the boundary: downgrades
        assert!(!set.bucket_is_dense(0));
        assert_eq!(set.cardinality(), threshold as u64 - 1);
        for i in 2..=threshold as u64 {
            assert!(set.contains(i));
        }

        // Climb back over the boundary.
        set.add(0);
        set.add(1);
        set.add(100);
        assert!(set.bucket_is_dense(0));
        assert_eq!(set.cardinality(), threshold as u64 + 2);
        let values: Vec<_> = set.iter().collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 100]);
    }

    #[test]
    fn test_cardinality_consistency_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = CompressedSet::with_threshold(32);
        let mut reference = std::collections::BTreeSet::new();

        // Values confined to one bucket so the threshold is crossed both
        // ways; a far bucket keeps the index itself honest.
        for _ in 0..3000 {
            let value = rng.gen_range(0..200u64);
            if rng.gen_bool(0.6) {
                assert_eq!(set.add(value), reference.insert(value));
            } else {
                assert_eq!(set.remove(value), reference.remove(&value));
            }
        }
        set.add(bits::MAX_VALUE);
        reference.insert(bits::MAX_VALUE);

        assert_eq!(set.cardinality(), reference.len() as u64);
        let values: Vec<_> = set.iter().collect();
        let expected: Vec<_> = reference.into_iter().collect();
        assert_eq!(values, expected);
        for &value in &expected {
            assert!(set.contains(value));
        }
    }
}
