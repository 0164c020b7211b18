//! Sorted index from bucket keys to containers.
//!
//! The index is a flat array of `(key, container)` entries kept in strictly
//! ascending key order, so lookups are a binary search over at most 65536
//! active buckets. Absence of a key means the bucket's set is empty: no
//! zero-cardinality entry persists (the owning set evicts them on remove).
//!
//! The bulk copy operations exist to support set algebra (union and
//! intersection) layered on top of this index later; they deep-copy every
//! container so the two indices remain independently mutable.

use crate::container::Container;

/// Initial backing capacity of the entry array.
const INIT_CAPACITY: usize = 4;

/// One bucket: a 16-bit key and the container holding its members.
#[derive(Clone, Debug)]
pub struct Entry {
    pub key: u16,
    pub container: Container,
}

/// Sorted, unique-key mapping from bucket key to container.
#[derive(Clone, Debug, Default)]
pub struct BucketIndex {
    /// Entries in strictly ascending key order.
    entries: Vec<Entry>,
}

impl BucketIndex {
    /// Creates an empty index.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(INIT_CAPACITY),
        }
    }

    /// Returns the number of active buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the index holds no buckets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all buckets and their containers.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Locates a key by binary search.
    ///
    /// Returns `Ok(position)` if present, `Err(insertion_point)` otherwise.
    #[inline]
    pub fn find(&self, key: u16) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |entry| entry.key)
    }

    /// Returns the container for a key, if the bucket exists.
    #[inline]
    pub fn get(&self, key: u16) -> Option<&Container> {
        self.find(key).ok().map(|pos| &self.entries[pos].container)
    }

    /// Returns the key at a position.
    #[inline]
    pub fn key_at(&self, pos: usize) -> u16 {
        self.entries[pos].key
    }

    /// Returns the container at a position.
    #[inline]
    pub fn container_at(&self, pos: usize) -> &Container {
        &self.entries[pos].container
    }

    /// Returns a mutable container at a position.
    #[inline]
    pub fn container_at_mut(&mut self, pos: usize) -> &mut Container {
        &mut self.entries[pos].container
    }

    /// Inserts a new bucket at a position, shifting the tail right.
    ///
    /// The position must be the insertion point reported by [`find`](Self::find)
    /// for `key`; ordering is checked in debug mode.
    pub fn insert_at(&mut self, pos: usize, key: u16, container: Container) {
        debug_assert!(pos == 0 || self.entries[pos - 1].key < key);
        debug_assert!(pos == self.entries.len() || key < self.entries[pos].key);
        self.reserve(1);
        self.entries.insert(pos, Entry { key, container });
    }

    /// Removes the bucket at a position, shifting the tail left.
    ///
    /// Backing capacity is not reclaimed.
    #[inline]
    pub fn remove_at(&mut self, pos: usize) {
        self.entries.remove(pos);
    }

    /// Returns the entries in key order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Appends deep copies of `other`'s entries in `[start, end)`.
    ///
    /// Keys must remain strictly ascending across the append; checked in
    /// debug mode.
    pub fn append_copies(&mut self, other: &Self, start: usize, end: usize) {
        self.reserve(end.saturating_sub(start));
        for entry in &other.entries[start..end] {
            self.append(entry.key, entry.container.clone());
        }
    }

    /// Appends deep copies of `other`'s entries with keys below `stopping_key`.
    pub fn append_copies_until(&mut self, other: &Self, stopping_key: u16) {
        for entry in &other.entries {
            if entry.key >= stopping_key {
                break;
            }
            self.reserve(1);
            self.append(entry.key, entry.container.clone());
        }
    }

    /// Appends deep copies of `other`'s entries with keys above `before_start`.
    ///
    /// `before_start` itself is the largest key not copied; it need not be
    /// present in `other`.
    pub fn append_copies_after(&mut self, other: &Self, before_start: u16) {
        let start = match other.find(before_start) {
            Ok(pos) => pos + 1,
            Err(pos) => pos,
        };
        self.append_copies(other, start, other.entries.len());
    }

    /// Appends a bucket at the end.
    fn append(&mut self, key: u16, container: Container) {
        debug_assert!(self.entries.last().is_none_or(|entry| entry.key < key));
        self.reserve(1);
        self.entries.push(Entry { key, container });
    }

    /// Ensures room for `extra` more entries, growing geometrically: x2
    /// below 1024 entries, x1.25 above.
    fn reserve(&mut self, extra: usize) {
        let needed = self.entries.len() + extra;
        if needed <= self.entries.capacity() {
            return;
        }
        let target = if self.entries.capacity() < 1024 {
            needed * 2
        } else {
            needed * 5 / 4
        };
        self.entries.reserve_exact(target - self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::CONVERSION_THRESHOLD;

    fn single(low: u32) -> Container {
        let mut container = Container::new();
        container.insert(low, CONVERSION_THRESHOLD);
        container
    }

    fn build(keys: &[u16]) -> BucketIndex {
        let mut index = BucketIndex::new();
        for &key in keys {
            let pos = index.find(key).unwrap_err();
            index.insert_at(pos, key, single(key as u32));
        }
        index
    }

    #[test]
    fn test_insert_and_find() {
        let index = build(&[30, 10, 20, u16::MAX, 0]);

        assert_eq!(index.len(), 5);
        let keys: Vec<_> = index.entries().iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec![0, 10, 20, 30, u16::MAX]);

        assert!(index.find(20).is_ok());
        assert_eq!(index.find(15), Err(2));
        assert!(index.get(10).is_some());
        assert!(index.get(15).is_none());
    }

    #[test]
    fn test_remove_at() {
        let mut index = build(&[1, 2, 3]);
        let pos = index.find(2).unwrap();
        index.remove_at(pos);

        assert_eq!(index.len(), 2);
        assert!(index.get(2).is_none());
        assert!(index.get(1).is_some());
        assert!(index.get(3).is_some());
    }

    #[test]
    fn test_append_copies_deep() {
        let source = build(&[5, 6, 7, 8]);

        let mut target = BucketIndex::new();
        target.append_copies(&source, 1, 3);
        let keys: Vec<_> = target.entries().iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec![6, 7]);

        // Copies must not alias: mutating the copy leaves the source intact.
        let pos = target.find(6).unwrap();
        target.container_at_mut(pos).insert(999, CONVERSION_THRESHOLD);
        assert!(target.container_at(pos).contains(999));
        assert!(!source.get(6).unwrap().contains(999));
    }

    #[test]
    fn test_append_copies_until() {
        let source = build(&[5, 6, 7, 8]);

        let mut target = BucketIndex::new();
        target.append_copies_until(&source, 7);
        let keys: Vec<_> = target.entries().iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec![5, 6]);

        // A stopping key below all entries copies nothing.
        let mut empty = BucketIndex::new();
        empty.append_copies_until(&source, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_append_copies_after() {
        let source = build(&[5, 6, 7, 8]);

        // Present key: copy strictly after it.
        let mut target = BucketIndex::new();
        target.append_copies_after(&source, 6);
        let keys: Vec<_> = target.entries().iter().map(|entry| entry.key).collect();
        assert_eq!(keys, vec![7, 8]);

        // Absent key: copy from its insertion point.
        let mut target = BucketIndex::new();
        target.append_copies_after(&source, 4);
        assert_eq!(target.len(), 4);
    }

    #[test]
    fn test_clone_is_deep() {
        let source = build(&[1]);
        let mut copy = source.clone();
        copy.container_at_mut(0).insert(2, CONVERSION_THRESHOLD);
        assert!(!source.container_at(0).contains(2));
        assert!(copy.container_at(0).contains(2));
    }

    #[test]
    fn test_many_buckets_stay_sorted() {
        let mut index = BucketIndex::new();
        // Insert in a scrambled but deterministic order.
        for i in 0..2000u16 {
            let key = i.wrapping_mul(7919);
            if let Err(pos) = index.find(key) {
                index.insert_at(pos, key, single(0));
            }
        }
        let keys: Vec<_> = index.entries().iter().map(|entry| entry.key).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
