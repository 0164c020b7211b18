//! Per-bucket value-set containers.
//!
//! A bucket's members are held in exactly one of two representations at a
//! time, chosen by cardinality:
//!
//! | Variant | Use case | Storage |
//! |---------|----------|---------|
//! | Sparse  | few members | sorted `Vec<u32>` |
//! | Dense   | many members | fixed 2^32-bit array |
//!
//! Containers convert between variants in place during mutation: an insert
//! into a sparse container already at the conversion threshold rehydrates
//! it into a dense one first; a removal that drops a dense container from
//! the threshold converts it back. Observable behavior is identical on both
//! sides of the switch.

pub mod dense;
pub mod sparse;

pub use dense::Dense;
pub use sparse::Sparse;

/// Cardinality at which a bucket switches representation.
///
/// Beyond this density a bitset is smaller than a sorted array of 32-bit
/// values, mirroring the array's per-element cost against the bitset's
/// fixed footprint.
pub const CONVERSION_THRESHOLD: usize = 4096;

/// A bucket's value set, polymorphic over the two representations.
#[derive(Clone, PartialEq, Eq)]
pub enum Container {
    /// Sorted array of distinct low values.
    Sparse(Sparse),
    /// Fixed-domain bitset.
    Dense(Dense),
}

impl Container {
    /// Creates a new empty container in the sparse representation.
    ///
    /// Buckets always start sparse; only the threshold policy makes them
    /// dense.
    #[inline]
    pub fn new() -> Self {
        Self::Sparse(Sparse::new())
    }

    /// Returns the number of members.
    ///
    /// Both variants track this incrementally; no scan is performed.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Sparse(sparse) => sparse.len(),
            Self::Dense(dense) => dense.len(),
        }
    }

    /// Returns whether the container is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether the container is currently dense.
    #[inline]
    pub fn is_dense(&self) -> bool {
        matches!(self, Self::Dense(_))
    }

    /// Checks if the container holds the given low value.
    #[inline]
    pub fn contains(&self, low: u32) -> bool {
        match self {
            Self::Sparse(sparse) => sparse.contains(low),
            Self::Dense(dense) => dense.contains(low),
        }
    }

    /// Inserts a low value.
    ///
    /// Returns `true` if the value was newly inserted. A sparse container
    /// whose cardinality is already at `threshold` converts to dense before
    /// the insert is delegated; this is the only insert path that changes
    /// the variant.
    pub fn insert(&mut self, low: u32, threshold: usize) -> bool {
        if let Self::Sparse(sparse) = &*self {
            if sparse.len() >= threshold {
                let dense = Dense::from_sparse(sparse);
                *self = Self::Dense(dense);
            }
        }
        match self {
            Self::Sparse(sparse) => sparse.insert(low, threshold),
            Self::Dense(dense) => dense.insert(low),
        }
    }

    /// Removes a low value.
    ///
    /// Returns `true` if the value was present. A dense container whose
    /// cardinality was exactly at `threshold` before a successful removal
    /// converts back to sparse, the symmetric boundary to the upgrade.
    pub fn remove(&mut self, low: u32, threshold: usize) -> bool {
        match self {
            Self::Sparse(sparse) => sparse.remove(low),
            Self::Dense(dense) => {
                let at_threshold = dense.len() == threshold;
                let removed = dense.remove(low);
                if removed && at_threshold {
                    let sparse = dense.to_sparse();
                    *self = Self::Sparse(sparse);
                }
                removed
            }
        }
    }

    /// Removes all members, keeping the current representation.
    #[inline]
    pub fn clear(&mut self) {
        match self {
            Self::Sparse(sparse) => sparse.clear(),
            Self::Dense(dense) => dense.clear(),
        }
    }

    /// Approximate in-memory footprint in bytes.
    ///
    /// An estimate, not a serialization length.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Sparse(sparse) => sparse.size_bytes(),
            Self::Dense(dense) => dense.size_bytes(),
        }
    }

    /// Returns an iterator over the members in ascending order.
    ///
    /// The iterator is lazy, finite, and restartable: each call starts a
    /// fresh pass.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        match self {
            Self::Sparse(sparse) => Iter::Sparse(sparse.iter()),
            Self::Dense(dense) => Iter::Dense(dense.iter()),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Container {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Sparse(sparse) => write!(f, "Sparse({} members)", sparse.len()),
            Self::Dense(dense) => write!(f, "Dense({} members)", dense.len()),
        }
    }
}

/// Iterator over the members of either representation.
pub enum Iter<'a> {
    Sparse(core::iter::Copied<core::slice::Iter<'a, u32>>),
    Dense(dense::Iter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sparse(iter) => iter.next(),
            Self::Dense(iter) => iter.next(),
        }
    }
}
