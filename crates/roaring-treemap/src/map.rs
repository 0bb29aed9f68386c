use std::collections::BTreeMap;
use std::collections::btree_map::{self, Entry};

use crate::{Container, Error, KeyOrder, Result};

/// Containers keyed by high key, ordered by a [`KeyOrder`].
///
/// Containers live in a slot vector and the ordered index maps keys to
/// slots. Entries are never removed, so a slot stays valid for the lifetime
/// of the map and can be remembered by callers to skip the index lookup.
#[derive(Clone, Debug)]
pub(crate) struct ContainerMap<C> {
    order: KeyOrder,
    index: BTreeMap<u32, usize>,
    slots: Vec<C>,
}

impl<C: Container> ContainerMap<C> {
    pub(crate) fn new(order: KeyOrder) -> Self {
        Self {
            order,
            index: BTreeMap::new(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn order(&self) -> KeyOrder {
        self.order
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// The slot holding the container for `high`.
    pub(crate) fn slot(&self, high: u32) -> Option<usize> {
        self.index.get(&self.order.sort_key(high)).copied()
    }

    pub(crate) fn get(&self, high: u32) -> Option<&C> {
        self.slot(high).map(|slot| &self.slots[slot])
    }

    pub(crate) fn get_mut(&mut self, high: u32) -> Option<&mut C> {
        self.slot(high).map(|slot| &mut self.slots[slot])
    }

    /// The container at a slot previously returned by this map.
    pub(crate) fn at_mut(&mut self, slot: usize) -> &mut C {
        &mut self.slots[slot]
    }

    /// Add a container for a high key that has none yet.
    pub(crate) fn push(&mut self, high: u32, container: C) -> Result<usize> {
        match self.index.entry(self.order.sort_key(high)) {
            Entry::Occupied(_) => Err(Error::InvariantViolation {
                high,
                reason: "a container already exists",
            }),
            Entry::Vacant(entry) => {
                let slot = self.slots.len();
                self.slots.push(container);
                entry.insert(slot);
                Ok(slot)
            }
        }
    }

    pub(crate) fn first_high(&self) -> Option<u32> {
        self.index
            .first_key_value()
            .map(|(key, _)| self.order.from_sort_key(*key))
    }

    pub(crate) fn last_high(&self) -> Option<u32> {
        self.index
            .last_key_value()
            .map(|(key, _)| self.order.from_sort_key(*key))
    }

    /// All `(high, container)` pairs in key order.
    pub(crate) fn iter(&self) -> Buckets<'_, C> {
        Buckets {
            order: self.order,
            index: self.index.range(..),
            slots: &self.slots,
        }
    }

    /// The `(high, container)` pairs whose key is `high` or later.
    pub(crate) fn iter_from(&self, high: u32) -> Buckets<'_, C> {
        Buckets {
            order: self.order,
            index: self.index.range(self.order.sort_key(high)..),
            slots: &self.slots,
        }
    }
}

/// Ordered iterator over the buckets of a [`ContainerMap`].
pub(crate) struct Buckets<'a, C> {
    order: KeyOrder,
    index: btree_map::Range<'a, u32, usize>,
    slots: &'a [C],
}

impl<'a, C> Iterator for Buckets<'a, C> {
    type Item = (u32, &'a C);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, slot) = self.index.next()?;
        Some((self.order.from_sort_key(*key), &self.slots[*slot]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.index.size_hint()
    }
}

impl<C> DoubleEndedIterator for Buckets<'_, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (key, slot) = self.index.next_back()?;
        Some((self.order.from_sort_key(*key), &self.slots[*slot]))
    }
}
