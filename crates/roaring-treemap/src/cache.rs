//! Lazily repaired prefix sums over bucket cardinalities.
//!
//! The cache mirrors the key sequence of a [`ContainerMap`] together with the
//! running total of container cardinalities. Only a prefix of it is trusted:
//! every entry whose key precedes the watermark is correct, everything from
//! the watermark onward must be recomputed before it is read.
//!
//! Mutations call [`CardinalityCache::invalidate_from`] with the key they
//! touched. Queries call [`CardinalityCache::ensure_valid_through`] with the
//! key they need, which walks the map from the watermark and stops as soon as
//! the requested key is covered. Stale entries past the valid prefix are kept
//! around and refreshed in place when the walk reaches them again, and all
//! searches are bounded by the valid prefix so they never match a stale key.

use crate::map::ContainerMap;
use crate::{Container, KeyOrder};

#[derive(Clone, Debug)]
pub(crate) struct CardinalityCache {
    order: KeyOrder,
    highs: Vec<u32>,
    cumulative: Vec<u64>,
    /// Length of the trusted prefix of `highs` and `cumulative`.
    valid: usize,
    /// First high key whose cumulative cardinality is not proven correct.
    watermark: u32,
    fully_valid: bool,
}

impl CardinalityCache {
    pub(crate) fn new(order: KeyOrder) -> Self {
        Self {
            order,
            highs: Vec::new(),
            cumulative: Vec::new(),
            valid: 0,
            watermark: order.lowest(),
            fully_valid: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn watermark(&self) -> u32 {
        self.watermark
    }

    #[cfg(test)]
    pub(crate) fn is_fully_valid(&self) -> bool {
        self.fully_valid
    }

    /// Number of leading entries that are known to be correct.
    #[cfg(test)]
    pub(crate) fn valid_len(&self) -> usize {
        self.valid
    }

    /// Distrust every cumulative cardinality from `high` onward.
    pub(crate) fn invalidate_from(&mut self, high: u32) {
        if self.order.compare(high, self.watermark).is_lt() {
            self.watermark = high;
        }
        self.fully_valid = false;

        let watermark = self.watermark;
        let order = self.order;
        self.valid = self.highs[..self.valid]
            .partition_point(|probe| order.compare(*probe, watermark).is_lt());
    }

    /// Repair the cache so that every key up to and including `target` is
    /// valid, and return the length of the valid prefix.
    ///
    /// The returned length is meant as an exclusive bound for searches.
    pub(crate) fn ensure_valid_through<C: Container>(
        &mut self,
        target: u32,
        map: &ContainerMap<C>,
    ) -> usize {
        if self.fully_valid || self.order.compare(target, self.watermark).is_lt() {
            return self.valid;
        }

        let start = self.watermark;
        let mut walked = 0usize;

        for (high, container) in map.iter_from(start) {
            if self.order.compare(high, target).is_gt() {
                break;
            }

            self.record(high, container.cardinality());
            walked += 1;
        }

        let reached_end = map
            .last_high()
            .is_none_or(|last| self.order.compare(last, target).is_le());
        if reached_end {
            self.fully_valid = true;
            debug_assert_eq!(self.valid, map.len());
            self.highs.truncate(self.valid);
            self.cumulative.truncate(self.valid);
        }

        tracing::trace!(
            start,
            target,
            walked,
            valid = self.valid,
            fully_valid = self.fully_valid,
            "repaired cumulative cardinalities"
        );

        self.valid
    }

    /// Store the running total for `high`, the next key after the valid prefix.
    fn record(&mut self, high: u32, cardinality: u64) {
        let index = self.valid;
        let total = self.cumulative_before(index) + cardinality;

        if self.highs.get(index) == Some(&high) {
            self.cumulative[index] = total;
        } else {
            self.highs.insert(index, high);
            self.cumulative.insert(index, total);
        }
        self.valid += 1;

        match self.order.successor(high) {
            Some(next) => self.watermark = next,
            None => {
                // `high` is the greatest possible key, nothing can follow it.
                self.watermark = high;
                self.fully_valid = true;
            }
        }
    }

    /// Search the first `bound` keys for `high`.
    pub(crate) fn search(&self, high: u32, bound: usize) -> Result<usize, usize> {
        self.order.search(&self.highs[..bound], high)
    }

    /// Total cardinality of the buckets before `index`.
    pub(crate) fn cumulative_before(&self, index: usize) -> u64 {
        match index.checked_sub(1) {
            Some(previous) => self.cumulative[previous],
            None => 0,
        }
    }

    /// Total cardinality of the valid prefix.
    pub(crate) fn total(&self) -> u64 {
        self.cumulative_before(self.valid)
    }

    /// Find the bucket holding the value at position `index`, returning its
    /// high key and the position within that bucket.
    ///
    /// Only meaningful once the cache is fully valid.
    pub(crate) fn locate(&self, index: u64) -> Option<(u32, u64)> {
        debug_assert!(self.fully_valid);

        let cumulative = &self.cumulative[..self.valid];
        let bucket = cumulative.partition_point(|total| *total <= index);
        if bucket == cumulative.len() {
            return None;
        }

        Some((self.highs[bucket], index - self.cumulative_before(bucket)))
    }
}
