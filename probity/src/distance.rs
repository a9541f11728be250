//! Multi-dimensional measure of how far a value is from its minimal form.

use std::cmp::Ordering;
use std::fmt;

use crate::shrinkable::{Shrinkable, Value};

/// Ordered sequence of non-negative magnitudes.
///
/// Distances compare lexicographically. A missing trailing dimension counts
/// as zero, so `[3]` and `[3, 0]` are equal while `[3]` is smaller than
/// `[3, 1]`. The minimum distance is the one whose dimensions are all zero.
///
/// A distance always has at least one dimension. Combined distances are
/// concatenations, so a component that reached its minimum must still occupy
/// a position or the following components would move up.
#[derive(Clone)]
pub struct ShrinkingDistance {
    dimensions: Vec<u64>,
}

impl Default for ShrinkingDistance {
    fn default() -> Self {
        Self::min()
    }
}

impl ShrinkingDistance {
    /// The smallest possible distance, `[0]`.
    pub fn min() -> Self {
        Self::of(0)
    }

    /// One-dimensional distance.
    pub fn of(magnitude: u64) -> Self {
        Self {
            dimensions: vec![magnitude],
        }
    }

    /// Empty `dimensions` give [`ShrinkingDistance::min`].
    pub fn from_dimensions(dimensions: impl IntoIterator<Item = u64>) -> Self {
        let dimensions: Vec<u64> = dimensions.into_iter().collect();
        if dimensions.is_empty() {
            return Self::min();
        }
        Self { dimensions }
    }

    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    pub fn is_min(&self) -> bool {
        self.dimensions.iter().all(|d| *d == 0)
    }

    /// Concatenates the dimensions of `other` after the dimensions of `self`.
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        let mut dimensions = Vec::with_capacity(self.dimensions.len() + other.dimensions.len());
        dimensions.extend_from_slice(&self.dimensions);
        dimensions.extend_from_slice(&other.dimensions);
        Self { dimensions }
    }

    /// Concatenates several distances in order. No distances at all
    /// combine to [`ShrinkingDistance::min`].
    pub fn combine<'a>(distances: impl IntoIterator<Item = &'a ShrinkingDistance>) -> Self {
        let dimensions: Vec<u64> = distances
            .into_iter()
            .flat_map(|d| d.dimensions.iter().copied())
            .collect();
        if dimensions.is_empty() {
            return Self::min();
        }
        Self { dimensions }
    }

    /// Dimension-wise sum. Dimensions present in only one operand are kept,
    /// sums saturate at `u64::MAX`.
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        let len = self.dimensions.len().max(other.dimensions.len());
        let dimensions = (0..len)
            .map(|i| {
                let left = self.dimensions.get(i).copied().unwrap_or(0);
                let right = other.dimensions.get(i).copied().unwrap_or(0);
                left.saturating_add(right)
            })
            .collect();
        Self { dimensions }
    }

    /// Distance of a collection: its size first, then the sum of all
    /// element distances.
    pub fn for_collection<T: Value>(elements: &[Shrinkable<T>]) -> Self {
        let sum = elements
            .iter()
            .fold(ShrinkingDistance::min(), |acc, e| acc.plus(&e.distance()));
        ShrinkingDistance::of(elements.len() as u64).append(&sum)
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.dimensions.len().max(other.dimensions.len());
        for i in 0..len {
            let left = self.dimensions.get(i).copied().unwrap_or(0);
            let right = other.dimensions.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ShrinkingDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ShrinkingDistance {}

impl fmt::Debug for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShrinkingDistance{:?}", self.dimensions)
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dimensions_count_as_zero() {
        assert_eq!(
            ShrinkingDistance::of(3),
            ShrinkingDistance::from_dimensions([3, 0])
        );
        assert!(ShrinkingDistance::of(3) < ShrinkingDistance::from_dimensions([3, 1]));
        assert_eq!(ShrinkingDistance::min(), ShrinkingDistance::of(0));
        assert!(ShrinkingDistance::from_dimensions([0, 0, 0]).is_min());
    }

    #[test]
    fn test_lexicographic_order() {
        let a = ShrinkingDistance::from_dimensions([1, 100]);
        let b = ShrinkingDistance::from_dimensions([2, 0]);
        assert!(a < b);
        assert!(ShrinkingDistance::from_dimensions([2, 5]) > ShrinkingDistance::of(2));
    }

    #[test]
    fn test_append_and_combine() {
        let a = ShrinkingDistance::from_dimensions([1, 2]);
        let b = ShrinkingDistance::of(7);
        assert_eq!(a.append(&b).dimensions(), &[1, 2, 7]);

        let combined = ShrinkingDistance::combine([&b, &a, &b]);
        assert_eq!(combined.dimensions(), &[7, 1, 2, 7]);
    }

    #[test]
    fn test_minimal_component_keeps_its_position() {
        let min = ShrinkingDistance::min();
        assert_eq!(min.dimensions(), &[0]);
        assert_eq!(ShrinkingDistance::from_dimensions([]).dimensions(), &[0]);
        assert_eq!(ShrinkingDistance::combine(Vec::<&ShrinkingDistance>::new()).dimensions(), &[0]);

        let present = ShrinkingDistance::from_dimensions([1, 175]);
        let other = ShrinkingDistance::of(194);
        let parent = ShrinkingDistance::combine([&present, &other]);
        let shrunk = ShrinkingDistance::combine([&min, &other]);
        assert_eq!(shrunk.dimensions(), &[0, 194]);
        assert!(shrunk < parent);
    }

    #[test]
    fn test_plus_saturates() {
        let a = ShrinkingDistance::from_dimensions([u64::MAX - 1, 4]);
        let b = ShrinkingDistance::from_dimensions([5]);
        let sum = a.plus(&b);
        assert_eq!(sum.dimensions(), &[u64::MAX, 4]);
    }

    #[test]
    fn test_for_collection() {
        let elements = vec![
            Shrinkable::unshrinkable_with_distance(1, ShrinkingDistance::of(4)),
            Shrinkable::unshrinkable_with_distance(2, ShrinkingDistance::of(6)),
        ];
        let distance = ShrinkingDistance::for_collection(&elements);
        assert_eq!(distance.dimensions(), &[2, 10]);

        let empty: Vec<Shrinkable<i32>> = Vec::new();
        assert_eq!(ShrinkingDistance::for_collection(&empty).dimensions(), &[0, 0]);
    }
}
