//! Ordered sets of disjoint half-open ranges.
//!
//! `IntervalSet<T>` stores `[start, end)` ranges in a `BTreeMap<start, end>`.
//! Overlapping or touching ranges are coalesced on insertion, so the map
//! always holds the minimal disjoint representation and every query is a
//! single ordered lookup.
//!
//! The scheduler keys these by `TimeBound` for trajectory locks (which may
//! run to `+∞`), but nothing here is time-specific.

use std::collections::BTreeMap;

/// A set of disjoint, non-adjacent half-open ranges `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalSet<T: Ord + Copy> {
    ranges: BTreeMap<T, T>,
}

impl<T: Ord + Copy> Default for IntervalSet<T> {
    fn default() -> Self {
        Self { ranges: BTreeMap::new() }
    }
}

impl<T: Ord + Copy> IntervalSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding the single range `[start, end)` (empty if `start >= end`).
    pub fn of(start: T, end: T) -> Self {
        let mut set = Self::new();
        set.add(start, end);
        set
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of disjoint ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Ranges in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (T, T)> + '_ {
        self.ranges.iter().map(|(&s, &e)| (s, e))
    }

    /// Smallest covered value, if any.
    pub fn min(&self) -> Option<T> {
        self.ranges.keys().next().copied()
    }

    /// Supremum of the covered values (exclusive), if any.
    pub fn max(&self) -> Option<T> {
        self.ranges.values().next_back().copied()
    }

    /// Add `[start, end)`, coalescing with any range it overlaps or touches.
    pub fn add(&mut self, start: T, end: T) {
        if start >= end {
            return;
        }
        let absorbed: Vec<T> = self
            .ranges
            .range(..=end)
            .rev()
            .take_while(|&(_, &e)| e >= start)
            .map(|(&s, _)| s)
            .collect();

        let (mut lo, mut hi) = (start, end);
        for s in absorbed {
            if let Some(e) = self.ranges.remove(&s) {
                lo = lo.min(s);
                hi = hi.max(e);
            }
        }
        self.ranges.insert(lo, hi);
    }

    /// Remove `[start, end)`, splitting any range that straddles it.
    pub fn remove(&mut self, start: T, end: T) {
        if start >= end {
            return;
        }
        let hit: Vec<T> = self
            .ranges
            .range(..end)
            .rev()
            .take_while(|&(_, &e)| e > start)
            .map(|(&s, _)| s)
            .collect();

        for s in hit {
            if let Some(e) = self.ranges.remove(&s) {
                if s < start {
                    self.ranges.insert(s, start);
                }
                if e > end {
                    self.ranges.insert(end, e);
                }
            }
        }
    }

    /// `true` if `value` lies in some range.
    pub fn contains(&self, value: T) -> bool {
        self.ranges
            .range(..=value)
            .next_back()
            .is_some_and(|(_, &e)| e > value)
    }

    /// `true` if `[start, end)` is entirely covered by one range.
    pub fn contains_range(&self, start: T, end: T) -> bool {
        if start >= end {
            return true;
        }
        self.ranges
            .range(..=start)
            .next_back()
            .is_some_and(|(_, &e)| e >= end)
    }

    /// `true` if `[start, end)` shares a non-empty part with the set.
    pub fn intersects_range(&self, start: T, end: T) -> bool {
        start < end
            && self
                .ranges
                .range(..end)
                .next_back()
                .is_some_and(|(_, &e)| e > start)
    }

    /// `true` if the two sets share a non-empty part.
    pub fn intersects(&self, other: &IntervalSet<T>) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().any(|(s, e)| large.intersects_range(s, e))
    }

    #[must_use]
    pub fn union(&self, other: &IntervalSet<T>) -> IntervalSet<T> {
        let mut out = self.clone();
        for (s, e) in other.iter() {
            out.add(s, e);
        }
        out
    }

    #[must_use]
    pub fn intersection(&self, other: &IntervalSet<T>) -> IntervalSet<T> {
        let mut out = IntervalSet::new();
        for (s, e) in other.iter() {
            for (&s2, &e2) in self.ranges.range(..e) {
                let (lo, hi) = (s.max(s2), e.min(e2));
                if lo < hi {
                    out.add(lo, hi);
                }
            }
        }
        out
    }

    #[must_use]
    pub fn difference(&self, other: &IntervalSet<T>) -> IntervalSet<T> {
        let mut out = self.clone();
        for (s, e) in other.iter() {
            out.remove(s, e);
        }
        out
    }
}

impl<T: Ord + Copy> FromIterator<(T, T)> for IntervalSet<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(iter: I) -> Self {
        let mut set = IntervalSet::new();
        for (s, e) in iter {
            set.add(s, e);
        }
        set
    }
}
