//! Sparse container: a sorted array of distinct low values.
//!
//! Efficient while a bucket holds few members; each member costs four bytes
//! plus amortized growth slack. Once the cardinality reaches the conversion
//! threshold, the owning [`Container`](super::Container) switches the bucket
//! to the dense representation.

/// Initial backing capacity of a sparse container.
const INIT_CAPACITY: usize = 4;

/// A sorted, duplicate-free array of `u32` low values.
///
/// The vector holds exactly the members, so its length is the cardinality
/// and the sorted/unique invariant is the only state to maintain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sparse {
    /// Members in strictly ascending order.
    values: Vec<u32>,
}

impl Default for Sparse {
    fn default() -> Self {
        Self::new()
    }
}

impl Sparse {
    /// Creates an empty sparse container.
    #[inline]
    pub fn new() -> Self {
        Self {
            values: Vec::with_capacity(INIT_CAPACITY),
        }
    }

    /// Creates a sparse container from a sorted, deduplicated vector.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if the values are not strictly ascending.
    #[inline]
    pub fn from_sorted_vec(values: Vec<u32>) -> Self {
        debug_assert!(
            values.is_empty() || values.windows(2).all(|w| w[0] < w[1]),
            "values must be sorted and unique"
        );
        Self { values }
    }

    /// Returns the number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the container is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks if the container holds the given low value.
    #[inline]
    pub fn contains(&self, low: u32) -> bool {
        self.values.binary_search(&low).is_ok()
    }

    /// Inserts a low value, keeping the array sorted.
    ///
    /// Returns `true` if the value was newly inserted. `capacity_limit` caps
    /// geometric growth (the conversion threshold: a sparse container never
    /// needs more room than that before it is converted to dense).
    ///
    /// The common append case (a new maximum) avoids the binary search and
    /// tail shift entirely.
    pub fn insert(&mut self, low: u32, capacity_limit: usize) -> bool {
        match self.values.last() {
            None => {
                self.values.push(low);
                true
            }
            Some(&max) if low > max => {
                self.reserve_one(capacity_limit);
                self.values.push(low);
                true
            }
            _ => match self.values.binary_search(&low) {
                Ok(_) => false,
                Err(pos) => {
                    self.reserve_one(capacity_limit);
                    // Shifts the tail right by one slot.
                    self.values.insert(pos, low);
                    true
                }
            },
        }
    }

    /// Removes a low value if present, shifting the tail left.
    ///
    /// Returns `true` if the value was present.
    pub fn remove(&mut self, low: u32) -> bool {
        match self.values.binary_search(&low) {
            Ok(pos) => {
                self.values.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Removes all members. Backing capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns an iterator over the members in ascending order.
    #[inline]
    pub fn iter(&self) -> core::iter::Copied<core::slice::Iter<'_, u32>> {
        self.values.iter().copied()
    }

    /// Returns the members as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    /// Approximate in-memory footprint in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.values.len() * 4 + 4
    }

    /// Grows the backing storage geometrically when full: x2 below 64
    /// elements, x1.5 below 1024, x1.25 above, capped at `capacity_limit`.
    fn reserve_one(&mut self, capacity_limit: usize) {
        let len = self.values.len();
        if len < self.values.capacity() {
            return;
        }
        let cap = self.values.capacity().max(INIT_CAPACITY);
        let grown = if cap < 64 {
            cap * 2
        } else if cap < 1024 {
            cap * 3 / 2
        } else {
            cap * 5 / 4
        };
        let target = grown.min(capacity_limit).max(len + 1);
        self.values.reserve_exact(target - len);
    }
}
