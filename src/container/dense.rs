//! Dense container: a fixed bitset over the full 32-bit low domain.
//!
//! The bit array is allocated whole (2^26 words, 512 MiB) the moment a
//! bucket turns dense, regardless of how many members it actually holds.
//! This mirrors the inherited layout: a dense bucket has a constant, large
//! footprint in exchange for O(1) membership tests. Callers should only
//! reach this representation through the conversion threshold.

use super::Sparse;

/// Number of 64-bit words covering the 32-bit low domain.
pub const WORDS: usize = 1 << 26;

/// A fixed-domain bitset with an incrementally maintained cardinality.
///
/// Bit `i` set means low value `i` is a member. The cardinality counter is
/// updated on every mutation and never recomputed by scanning.
#[derive(Clone, PartialEq, Eq)]
pub struct Dense {
    /// One bit per possible low value.
    words: Box<[u64]>,
    /// Number of set bits.
    cardinality: usize,
}

impl Dense {
    /// Creates a dense container with all bits unset.
    pub fn new() -> Self {
        Self {
            words: vec![0u64; WORDS].into_boxed_slice(),
            cardinality: 0,
        }
    }

    /// Creates a dense container holding every member of a sparse one.
    pub fn from_sparse(sparse: &Sparse) -> Self {
        let mut words = vec![0u64; WORDS].into_boxed_slice();
        for low in sparse.iter() {
            words[(low >> 6) as usize] |= 1u64 << (low & 63);
        }
        Self {
            words,
            cardinality: sparse.len(),
        }
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.cardinality
    }

    /// Returns whether the container is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Checks if the container holds the given low value.
    #[inline]
    pub fn contains(&self, low: u32) -> bool {
        self.words[(low >> 6) as usize] & (1u64 << (low & 63)) != 0
    }

    /// Sets the bit for a low value.
    ///
    /// Returns `true` and bumps the cardinality only if the bit transitioned
    /// from unset to set.
    #[inline]
    pub fn insert(&mut self, low: u32) -> bool {
        let word = &mut self.words[(low >> 6) as usize];
        let mask = 1u64 << (low & 63);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.cardinality += 1;
        true
    }

    /// Clears the bit for a low value.
    ///
    /// Returns `true` and drops the cardinality only if the bit was set.
    #[inline]
    pub fn remove(&mut self, low: u32) -> bool {
        let word = &mut self.words[(low >> 6) as usize];
        let mask = 1u64 << (low & 63);
        if *word & mask == 0 {
            return false;
        }
        *word &= !mask;
        self.cardinality -= 1;
        true
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        if self.cardinality != 0 {
            self.words.fill(0);
            self.cardinality = 0;
        }
    }

    /// Rehydrates the members into a sparse container.
    ///
    /// Scans the full word array; intended for the downgrade path where the
    /// cardinality has dropped back to the conversion threshold.
    pub fn to_sparse(&self) -> Sparse {
        let mut values = Vec::with_capacity(self.cardinality);
        for (word_idx, &word) in self.words.iter().enumerate() {
            let mut remaining = word;
            while remaining != 0 {
                let lowest = remaining & remaining.wrapping_neg();
                values.push((word_idx as u32) * 64 + lowest.trailing_zeros());
                remaining ^= lowest;
            }
        }
        Sparse::from_sorted_vec(values)
    }

    /// Returns an iterator over the members in ascending order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            word_idx: 0,
            current: self.words[0],
        }
    }

    /// Approximate in-memory footprint in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        WORDS * 8
    }
}

impl Default for Dense {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Dense {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Dense({} members)", self.cardinality)
    }
}

/// Iterator over set bits, one word at a time.
///
/// Uses the lowest-set-bit trick (`w & -w`) to enumerate positions in
/// ascending order without testing bits one by one.
pub struct Iter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
        let lowest = self.current & self.current.wrapping_neg();
        self.current ^= lowest;
        Some((self.word_idx as u32) * 64 + lowest.trailing_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_and_count() {
        let mut container = Dense::new();
        assert!(container.is_empty());

        assert!(container.insert(0));
        assert!(container.insert(63));
        assert!(container.insert(64));
        assert!(container.insert(u32::MAX));
        assert!(!container.insert(63)); // Idempotent

        assert_eq!(container.len(), 4);
        assert!(container.contains(0));
        assert!(container.contains(63));
        assert!(container.contains(64));
        assert!(container.contains(u32::MAX));
        assert!(!container.contains(1));

        assert!(container.remove(63));
        assert!(!container.remove(63)); // Already gone
        assert!(!container.remove(1)); // Never present
        assert_eq!(container.len(), 3);

        container.clear();
        assert!(container.is_empty());
        assert!(!container.contains(0));
    }

    #[test]
    fn test_iteration_and_sparse_roundtrip() {
        // Values chosen to cross word boundaries and exercise the in-word
        // bit scan.
        let values = vec![0u32, 1, 63, 64, 65, 127, 128, 4096, 1 << 20, u32::MAX - 1];
        let sparse = Sparse::from_sorted_vec(values.clone());
        let dense = Dense::from_sparse(&sparse);

        assert_eq!(dense.len(), values.len());
        for &v in &values {
            assert!(dense.contains(v), "missing value {}", v);
        }

        let iterated: Vec<_> = dense.iter().collect();
        assert_eq!(iterated, values);

        // Iteration is restartable.
        let again: Vec<_> = dense.iter().collect();
        assert_eq!(again, values);

        let back = dense.to_sparse();
        assert_eq!(back.as_slice(), &values[..]);
    }
}
