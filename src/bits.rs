//! Decomposition of 48-bit values into bucket keys and low values.
//!
//! Every stored value lives in `[0, 2^48)`. The top 16 bits (bits 32-47)
//! select a bucket; the low 32 bits are the member stored inside that
//! bucket's container:
//!
//! ```text
//! 48-bit value
//! +---------------+-------------------------------+
//! | high 16 bits  |          low 32 bits          |
//! +---------------+-------------------------------+
//!         |                       |
//!         v                       v
//!    bucket key            container member
//! ```
//!
//! All comparisons on keys and low values are performed on `u16`/`u32`
//! directly, so ordering is unsigned by construction. Lookups in sorted
//! storage use `slice::binary_search`, whose `Result<usize, usize>` carries
//! the insertion point on a miss.

/// Number of bits in the value domain.
pub const VALUE_BITS: u32 = 48;

/// Largest representable value (inclusive).
pub const MAX_VALUE: u64 = (1 << VALUE_BITS) - 1;

/// Extracts the bucket key (bits 32-47) from a 48-bit value.
///
/// Bits above 47 are the caller's responsibility to avoid.
#[inline]
pub const fn high_bits(value: u64) -> u16 {
    (value >> 32) as u16
}

/// Extracts the low 32 bits (container member) from a 48-bit value.
#[inline]
pub const fn low_bits(value: u64) -> u32 {
    value as u32
}

/// Combines a bucket key and a low value into a 48-bit value.
#[inline]
pub const fn combine(key: u16, low: u32) -> u64 {
    ((key as u64) << 32) | (low as u64)
}
