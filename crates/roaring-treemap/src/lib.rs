//! A compressed bitmap for sets of 64-bit integers.
//!
//! Every value is split into a 32-bit high key, which selects a bucket, and a
//! 32-bit low key, which is stored in that bucket's [`Container`] (a
//! [`RoaringBitmap`](roaring::RoaringBitmap) by default). Buckets are kept in
//! the order chosen by a [`KeyOrder`], so the same structure can hold values
//! ordered as `i64` or as `u64`.
//!
//! Cardinality, rank and select are answered from a lazily repaired table of
//! cumulative bucket cardinalities. Insertions only invalidate the table from
//! the bucket they touch onward, and queries only repair as far as they need.
//!
//! ```
//! use roaring_treemap::Bitmap64;
//!
//! let bitmap = Bitmap64::from_values(&[5, 3, 100, 3]);
//! assert_eq!(bitmap.cardinality(), 3);
//! assert_eq!(bitmap.select(1).unwrap(), 5);
//! assert_eq!(bitmap.rank(100), 2);
//! ```

mod bitmap;
mod cache;
mod container;
mod error;
mod map;
mod order;
mod persist;

#[cfg(test)]
mod tests_order;
#[cfg(test)]
mod tests_persist;

pub use bitmap::{Bitmap64, Iter};
pub use container::Container;
pub use error::{Error, Result};
pub use order::KeyOrder;

/// The upper 32 bits of `value`, used as the bucket selector.
#[inline]
pub fn high(value: u64) -> u32 {
    (value >> 32) as u32
}

/// The lower 32 bits of `value`, stored inside the bucket's container.
#[inline]
pub fn low(value: u64) -> u32 {
    value as u32
}

/// Recombine a high and a low key into a 64-bit value.
///
/// Packing works on bit patterns and does not depend on the [`KeyOrder`].
#[inline]
pub fn pack(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}
