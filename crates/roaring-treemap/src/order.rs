use std::cmp::Ordering;

const SIGN_BIT: u32 = 0x8000_0000;

/// The total order applied to high keys, and through them to whole values.
///
/// The order is picked once when a bitmap is created. Every key comparison,
/// cache search and "highest key" sentinel inside the bitmap goes through it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyOrder {
    /// Values compare as `i64`: negative values precede zero.
    #[default]
    Signed,
    /// Values compare as `u64`: zero is the smallest value.
    Unsigned,
}

impl KeyOrder {
    /// Map the persisted boolean flag back to an order.
    pub fn from_signed_flag(signed: bool) -> Self {
        if signed {
            KeyOrder::Signed
        } else {
            KeyOrder::Unsigned
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, KeyOrder::Signed)
    }

    /// Compare two high keys.
    #[inline]
    pub fn compare(self, a: u32, b: u32) -> Ordering {
        self.sort_key(a).cmp(&self.sort_key(b))
    }

    /// Compare two full 64-bit values.
    ///
    /// This agrees with comparing `(high, low)` pairs where the high keys use
    /// [`compare`](Self::compare) and the low keys are unsigned.
    #[inline]
    pub fn compare_values(self, a: u64, b: u64) -> Ordering {
        match self {
            KeyOrder::Signed => (a as i64).cmp(&(b as i64)),
            KeyOrder::Unsigned => a.cmp(&b),
        }
    }

    /// The greatest possible high key: `i32::MAX` or all ones.
    pub fn highest(self) -> u32 {
        self.from_sort_key(u32::MAX)
    }

    /// The smallest possible high key: `i32::MIN` or zero.
    pub fn lowest(self) -> u32 {
        self.from_sort_key(0)
    }

    /// The high key that immediately follows `high`, if any.
    pub fn successor(self, high: u32) -> Option<u32> {
        self.sort_key(high)
            .checked_add(1)
            .map(|key| self.from_sort_key(key))
    }

    /// Binary search a slice of high keys sorted by this order.
    pub fn search(self, highs: &[u32], high: u32) -> std::result::Result<usize, usize> {
        highs.binary_search_by(|probe| self.compare(*probe, high))
    }

    /// A key whose natural `u32` order matches this order.
    ///
    /// Flipping the sign bit turns two's complement order into unsigned
    /// order, and it is its own inverse.
    #[inline]
    pub(crate) fn sort_key(self, high: u32) -> u32 {
        match self {
            KeyOrder::Signed => high ^ SIGN_BIT,
            KeyOrder::Unsigned => high,
        }
    }

    #[inline]
    pub(crate) fn from_sort_key(self, key: u32) -> u32 {
        self.sort_key(key)
    }
}
