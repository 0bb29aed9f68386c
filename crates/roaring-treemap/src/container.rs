use std::io;

use roaring::RoaringBitmap;

use crate::{Error, Result};

/// A 32-bit set holding the low keys of one bucket.
///
/// Low keys are always ordered as unsigned integers, whatever the
/// [`KeyOrder`](crate::KeyOrder) of the owning bitmap.
pub trait Container: Clone + Default {
    /// Ascending iterator over the low keys.
    type Iter<'a>: DoubleEndedIterator<Item = u32>
    where
        Self: 'a;

    /// Insert `low`, returning `true` if it was not present.
    fn add(&mut self, low: u32) -> bool;

    fn contains(&self, low: u32) -> bool;

    fn cardinality(&self) -> u64;

    /// The number of low keys strictly smaller than `low`.
    fn rank(&self, low: u32) -> u64;

    /// The low key at 0-based position `index`, or `None` past the end.
    fn select(&self, index: u32) -> Option<u32>;

    fn iter(&self) -> Self::Iter<'_>;

    /// Whether this container may take part in [`union_in_place`](Self::union_in_place).
    ///
    /// Bitmaps check every bucket involved in a union before mutating any of
    /// them, so a container that answers `false` here is never half merged.
    fn is_union_capable(&self) -> bool {
        true
    }

    /// Merge `other` into `self`.
    fn union_in_place(&mut self, other: &Self) -> Result<()>;

    /// A short name for this container's variant, used in error messages.
    fn variant(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The number of bytes [`write_to`](Self::write_to) produces.
    fn serialized_size(&self) -> usize;

    fn write_to<W: io::Write>(&self, writer: W) -> io::Result<()>;

    fn read_from<R: io::Read>(reader: R) -> io::Result<Self>;
}

impl Container for RoaringBitmap {
    type Iter<'a> = roaring::bitmap::Iter<'a>;

    fn add(&mut self, low: u32) -> bool {
        self.insert(low)
    }

    fn contains(&self, low: u32) -> bool {
        RoaringBitmap::contains(self, low)
    }

    fn cardinality(&self) -> u64 {
        self.len()
    }

    fn rank(&self, low: u32) -> u64 {
        // Roaring ranks are inclusive of `low` itself.
        match low.checked_sub(1) {
            Some(below) => RoaringBitmap::rank(self, below),
            None => 0,
        }
    }

    fn select(&self, index: u32) -> Option<u32> {
        RoaringBitmap::select(self, index)
    }

    fn iter(&self) -> Self::Iter<'_> {
        RoaringBitmap::iter(self)
    }

    fn union_in_place(&mut self, other: &Self) -> Result<()> {
        *self |= other;
        Ok(())
    }

    fn variant(&self) -> &'static str {
        "RoaringBitmap"
    }

    fn serialized_size(&self) -> usize {
        RoaringBitmap::serialized_size(self)
    }

    fn write_to<W: io::Write>(&self, writer: W) -> io::Result<()> {
        self.serialize_into(writer)
    }

    fn read_from<R: io::Read>(reader: R) -> io::Result<Self> {
        RoaringBitmap::deserialize_from(reader)
    }
}

/// The error returned when two containers cannot be merged.
pub(crate) fn unsupported_union<C: Container>(ours: Option<&C>, theirs: &C) -> Error {
    let ours = ours.map_or(std::any::type_name::<C>(), C::variant);
    Error::UnsupportedOperation(format!(
        "union is not supported between {ours} and {}",
        theirs.variant()
    ))
}
