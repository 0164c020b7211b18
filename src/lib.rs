//! Compressed sets of 48-bit device-derived identifiers.
//!
//! Provides a memory-efficient representation for sets of 48-bit integers
//! using bucketing and adaptive container types. Values are partitioned into
//! buckets by the 16 bits above the low word, with each bucket stored in one
//! of two container types optimized for different data densities.
//!
//! # Architecture
//!
//! Each 48-bit value is split into a 16-bit bucket key (selecting a
//! container) and a low 32-bit value (stored within that container):
//!
//! ```text
//! 48-bit value (held in a u64)
//! +-------------------+-----------------------------------+
//! | high 16 bits (key)|           low 32 bits             |
//! +-------------------+-----------------------------------+
//!           |                           |
//!           v                           v
//!     BucketIndex key           Container member
//! ```
//!
//! The set stores containers in a sorted flat index, where each bucket holds
//! values in the range `[key * 2^32, (key + 1) * 2^32)`:
//!
//! ```text
//! CompressedSet
//! +------------------------------------------------------------+
//! |               BucketIndex: sorted Vec<Entry>               |
//! +------------------------------------------------------------+
//! |  key 0           |  key 1           |  key 5      |  ...   |
//! +------------------+------------------+-------------+--------+
//!         |                   |                |
//!         v                   v                v
//! +---------------+   +---------------+   +---------------+
//! |    Sparse     |   |     Dense     |   |    Sparse     |
//! | [3, 7, 42,    |   | 1011010...    |   | [12, 99]      |
//! |  100, 8000]   |   | (2^32 bits)   |   |               |
//! +---------------+   +---------------+   +---------------+
//!  <= 4096 values      > 4096 values
//! ```
//!
//! Containers convert between types during mutation: an insert that pushes a
//! sparse container past the conversion threshold upgrades it to dense, and
//! a removal that drops a dense container back to the threshold downgrades
//! it. Both directions are invisible to callers.
//!
//! # Example
//!
//! ```rust
//! use roaring48::CompressedSet;
//!
//! let mut set = CompressedSet::new();
//! set.add(1_474_976_710_656);
//! assert!(set.contains(1_474_976_710_656));
//! assert_eq!(set.cardinality(), 1);
//!
//! set.remove(1_474_976_710_656);
//! assert!(set.is_empty());
//! ```
//!
//! The [`registry`] module layers label-keyed storage and external
//! identifier parsing on top of the core set.

pub mod bits;
pub mod container;
pub mod index;
pub mod registry;
pub mod set;

pub use registry::Registry;
pub use set::CompressedSet;
