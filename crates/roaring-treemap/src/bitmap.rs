use std::cell::RefCell;

use roaring::RoaringBitmap;

use crate::cache::CardinalityCache;
use crate::container::unsupported_union;
use crate::map::{Buckets, ContainerMap};
use crate::{Container, Error, KeyOrder, Result, high, low, pack};

/// A compressed set of 64-bit values.
///
/// Values are grouped by their upper 32 bits into buckets, each backed by a
/// 32-bit [`Container`]. Buckets are ordered by the [`KeyOrder`] chosen at
/// construction, which decides whether values behave as `i64` or as `u64`.
///
/// Cardinality, rank and select read a cache of cumulative bucket
/// cardinalities that is repaired lazily, so queries take `&self`. The cache
/// uses interior mutability: a `Bitmap64` can be sent to another thread but
/// not shared between threads.
#[derive(Clone, Debug)]
pub struct Bitmap64<C = RoaringBitmap> {
    order: KeyOrder,
    containers: ContainerMap<C>,
    cache: RefCell<CardinalityCache>,
    /// High key and slot of the most recently used bucket.
    last_bucket: Option<(u32, usize)>,
}

impl Bitmap64 {
    /// Create an empty bitmap with signed ordering.
    pub fn new() -> Self {
        Self::empty(KeyOrder::Signed)
    }

    /// Create an empty bitmap with the given ordering.
    pub fn with_order(order: KeyOrder) -> Self {
        Self::empty(order)
    }

    /// Create a signed bitmap holding `values`.
    ///
    /// Values don't have to be sorted, but sorted input makes consecutive
    /// insertions hit the same bucket.
    pub fn from_values(values: &[u64]) -> Self {
        let mut bitmap = Self::new();
        bitmap.add_many(values);
        bitmap
    }
}

impl<C: Container> Bitmap64<C> {
    /// Create an empty bitmap over containers of type `C`.
    pub fn empty(order: KeyOrder) -> Self {
        Self::from_parts(ContainerMap::new(order))
    }

    pub(crate) fn from_parts(containers: ContainerMap<C>) -> Self {
        let order = containers.order();
        Self {
            order,
            containers,
            cache: RefCell::new(CardinalityCache::new(order)),
            last_bucket: None,
        }
    }

    pub(crate) fn containers(&self) -> &ContainerMap<C> {
        &self.containers
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> std::cell::Ref<'_, CardinalityCache> {
        self.cache.borrow()
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    /// Number of non-empty high key buckets.
    pub fn bucket_count(&self) -> usize {
        self.containers.len()
    }

    /// Insert `value`, returning `true` if it was not already present.
    ///
    /// # Panics
    ///
    /// Panics if the bucket index and its slots disagree about whether a
    /// container exists for the value's high key.
    pub fn add(&mut self, value: u64) -> bool {
        let high = high(value);

        let slot = match self.last_bucket {
            Some((last, slot)) if last == high => slot,
            _ => {
                let slot = match self.containers.slot(high) {
                    Some(slot) => slot,
                    None => self
                        .containers
                        .push(high, C::default())
                        .unwrap_or_else(|err| panic!("{err}")),
                };
                self.last_bucket = Some((high, slot));
                slot
            }
        };

        let inserted = self.containers.at_mut(slot).add(low(value));
        if inserted {
            self.cache.get_mut().invalidate_from(high);
        }

        inserted
    }

    /// Insert every value of `values`, in order.
    pub fn add_many(&mut self, values: &[u64]) {
        for &value in values {
            self.add(value);
        }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.containers
            .get(high(value))
            .is_some_and(|container| container.contains(low(value)))
    }

    /// Returns `true` if the bitmap holds no values.
    pub fn is_empty(&self) -> bool {
        self.containers
            .iter()
            .all(|(_, container)| container.cardinality() == 0)
    }

    /// The number of values in the bitmap.
    pub fn cardinality(&self) -> u64 {
        let mut cache = self.cache.borrow_mut();
        cache.ensure_valid_through(self.order.highest(), &self.containers);
        cache.total()
    }

    /// The number of values strictly smaller than `value` in this bitmap's
    /// order.
    pub fn rank(&self, value: u64) -> u64 {
        let high = high(value);

        let mut cache = self.cache.borrow_mut();
        let bound = cache.ensure_valid_through(high, &self.containers);

        match cache.search(high, bound) {
            Ok(index) => {
                let within = self
                    .containers
                    .get(high)
                    .map_or(0, |container| container.rank(low(value)));
                cache.cumulative_before(index) + within
            }
            Err(index) => cache.cumulative_before(index),
        }
    }

    /// The value at 0-based position `index` in ascending order.
    ///
    /// Fails with [`Error::IndexOutOfRange`] if `index` is not smaller than
    /// the cardinality.
    pub fn select(&self, index: u64) -> Result<u64> {
        let mut cache = self.cache.borrow_mut();
        cache.ensure_valid_through(self.order.highest(), &self.containers);

        let Some((high, offset)) = cache.locate(index) else {
            return Err(Error::IndexOutOfRange {
                index,
                cardinality: cache.total(),
            });
        };

        let low = u32::try_from(offset)
            .ok()
            .and_then(|offset| self.containers.get(high)?.select(offset))
            .ok_or(Error::InvariantViolation {
                high,
                reason: "cached cardinality exceeds the container",
            })?;

        Ok(pack(high, low))
    }

    /// The smallest value, or `None` if the bitmap is empty.
    pub fn min(&self) -> Option<u64> {
        self.iter().next()
    }

    /// The largest value, or `None` if the bitmap is empty.
    pub fn max(&self) -> Option<u64> {
        self.iter().next_back()
    }

    /// Merge every value of `other` into this bitmap.
    ///
    /// Buckets missing here are cloned from `other`, so later changes to
    /// either bitmap never leak into the other. Every bucket involved is
    /// checked with [`Container::is_union_capable`] before anything is
    /// modified.
    pub fn union_with(&mut self, other: &Bitmap64<C>) -> Result<()> {
        if self.order != other.order {
            return Err(Error::OrderMismatch {
                this: self.order,
                other: other.order,
            });
        }

        for (high, theirs) in other.containers.iter() {
            let ours = self.containers.get(high);
            if !theirs.is_union_capable() || ours.is_some_and(|ours| !ours.is_union_capable()) {
                return Err(unsupported_union(ours, theirs));
            }
        }

        let Some(first) = other.containers.first_high() else {
            return Ok(());
        };
        self.cache.get_mut().invalidate_from(first);

        let mut cloned = 0usize;
        for (high, theirs) in other.containers.iter() {
            match self.containers.get_mut(high) {
                Some(ours) => ours.union_in_place(theirs)?,
                None => {
                    self.containers.push(high, theirs.clone())?;
                    cloned += 1;
                }
            }
        }

        tracing::debug!(
            merged = other.containers.len() - cloned,
            cloned,
            buckets = self.containers.len(),
            "merged 64-bit bitmaps"
        );

        Ok(())
    }

    /// Iterate over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, C> {
        Iter {
            buckets: self.containers.iter(),
            front: None,
            back: None,
        }
    }
}

impl<C: Container> Default for Bitmap64<C> {
    fn default() -> Self {
        Self::empty(KeyOrder::default())
    }
}

impl<C: Container> PartialEq for Bitmap64<C> {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.iter().eq(other.iter())
    }
}

impl<C: Container> Eq for Bitmap64<C> {}

impl<C: Container> Extend<u64> for Bitmap64<C> {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<C: Container> FromIterator<u64> for Bitmap64<C> {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut bitmap = Self::default();
        bitmap.extend(iter);
        bitmap
    }
}

impl<'a, C: Container> IntoIterator for &'a Bitmap64<C> {
    type Item = u64;
    type IntoIter = Iter<'a, C>;

    fn into_iter(self) -> Iter<'a, C> {
        self.iter()
    }
}

/// Iterator over the values of a [`Bitmap64`], in the bitmap's order.
pub struct Iter<'a, C: Container + 'a> {
    buckets: Buckets<'a, C>,
    front: Option<(u32, C::Iter<'a>)>,
    back: Option<(u32, C::Iter<'a>)>,
}

impl<C: Container> Iterator for Iter<'_, C> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((high, lows)) = &mut self.front {
                if let Some(low) = lows.next() {
                    return Some(pack(*high, low));
                }
                self.front = None;
            }

            match self.buckets.next() {
                Some((high, container)) => self.front = Some((high, container.iter())),
                None => {
                    let (high, lows) = self.back.as_mut()?;
                    return lows.next().map(|low| pack(*high, low));
                }
            }
        }
    }
}

impl<C: Container> DoubleEndedIterator for Iter<'_, C> {
    fn next_back(&mut self) -> Option<u64> {
        loop {
            if let Some((high, lows)) = &mut self.back {
                if let Some(low) = lows.next_back() {
                    return Some(pack(*high, low));
                }
                self.back = None;
            }

            match self.buckets.next_back() {
                Some((high, container)) => self.back = Some((high, container.iter())),
                None => {
                    let (high, lows) = self.front.as_mut()?;
                    return lows.next_back().map(|low| pack(*high, low));
                }
            }
        }
    }
}
