//! Deterministic enumeration of every value an arbitrary can produce.
//!
//! Each [`ExhaustiveGenerator`] knows an upper bound on how many values it
//! yields. Construction fails with `None` when that bound exceeds the caller's
//! ceiling or cannot be represented, so callers fall back to random
//! generation.

use std::sync::Arc;

use crate::shrinkable::Value;

/// Largest number of values any exhaustive generator may enumerate.
pub const MAXIMUM_SAMPLES_TO_GENERATE: u64 = i64::MAX as u64;

type ValuesFn<T> = dyn Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync;

/// Finite, replayable enumeration of values.
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    values: Arc<ValuesFn<T>>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            max_count: self.max_count,
            values: Arc::clone(&self.values),
        }
    }
}

impl<T: Value> ExhaustiveGenerator<T> {
    /// `values` must yield at most `max_count` values on every call.
    pub fn new<F>(max_count: u64, max_samples: u64, values: F) -> Option<Self>
    where
        F: Fn() -> Box<dyn Iterator<Item = T>> + Send + Sync + 'static,
    {
        if max_count > max_samples.min(MAXIMUM_SAMPLES_TO_GENERATE) {
            return None;
        }
        Some(Self {
            max_count,
            values: Arc::new(values),
        })
    }

    pub fn from_values(values: Vec<T>, max_samples: u64) -> Option<Self> {
        let values = Arc::new(values);
        Self::new(values.len() as u64, max_samples, move || {
            let values = Arc::clone(&values);
            Box::new((0..values.len()).filter_map(move |i| values.get(i).cloned()))
        })
    }

    /// Upper bound on the number of values yielded.
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.values)()
    }

    pub fn map<U, F>(&self, mapper: F) -> ExhaustiveGenerator<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_with(Arc::new(mapper))
    }

    pub(crate) fn map_with<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> ExhaustiveGenerator<U> {
        let source = self.clone();
        ExhaustiveGenerator {
            max_count: self.max_count,
            values: Arc::new(move || {
                let mapper = Arc::clone(&mapper);
                Box::new(source.iter().map(move |value| mapper(value)))
            }),
        }
    }

    /// Keeps values satisfying `predicate`. The count stays an upper bound.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Arc::new(predicate))
    }

    pub(crate) fn filter_with(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Self {
        let source = self.clone();
        Self {
            max_count: self.max_count,
            values: Arc::new(move || {
                let predicate = Arc::clone(&predicate);
                Box::new(source.iter().filter(move |value| predicate(value)))
            }),
        }
    }

    pub(crate) fn filter_map_with<U: Value>(
        &self,
        mapper: Arc<dyn Fn(T) -> Option<U> + Send + Sync>,
    ) -> ExhaustiveGenerator<U> {
        let source = self.clone();
        ExhaustiveGenerator {
            max_count: self.max_count,
            values: Arc::new(move || {
                let mapper = Arc::clone(&mapper);
                Box::new(source.iter().filter_map(move |value| mapper(value)))
            }),
        }
    }

    /// All values wrapped in `Some`, followed by `None`.
    pub fn inject_null(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Option<T>>> {
        let source = self.clone();
        ExhaustiveGenerator::new(self.max_count.checked_add(1)?, max_samples, move || {
            Box::new(source.iter().map(Some).chain(std::iter::once(None)))
        })
    }

    /// For every value, all values of the generator `mapper` returns for it.
    ///
    /// The count is the sum of the dependent counts, which requires
    /// enumerating this generator once up front.
    pub fn flat_map<U, F>(&self, mapper: F, max_samples: u64) -> Option<ExhaustiveGenerator<U>>
    where
        U: Value,
        F: Fn(T) -> Option<ExhaustiveGenerator<U>> + Send + Sync + 'static,
    {
        let mut max_count: u64 = 0;
        for value in self.iter() {
            let dependent = mapper(value)?;
            max_count = max_count.checked_add(dependent.max_count())?;
            if max_count > max_samples {
                return None;
            }
        }
        let source = self.clone();
        let mapper = Arc::new(mapper);
        ExhaustiveGenerator::new(max_count, max_samples, move || {
            let mapper = Arc::clone(&mapper);
            Box::new(
                source
                    .iter()
                    .flat_map(move |value| mapper(value).into_iter().flat_map(|g| g.iter())),
            )
        })
    }
}

/// Cartesian product; the first generator varies slowest.
pub fn product<A: Value, B: Value>(
    first: &ExhaustiveGenerator<A>,
    second: &ExhaustiveGenerator<B>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<(A, B)>> {
    let max_count = first.max_count().checked_mul(second.max_count())?;
    let first = first.clone();
    let second = second.clone();
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        let second = second.clone();
        Box::new(first.iter().flat_map(move |a| {
            second.iter().map(move |b| (a.clone(), b))
        }))
    })
}

/// Every combination of one value from each generator, in order.
pub fn combine<T: Value>(
    generators: Vec<ExhaustiveGenerator<T>>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let max_count = generators
        .iter()
        .try_fold(1u64, |count, g| count.checked_mul(g.max_count()))?;
    let generators = Arc::new(generators);
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        sequences(Arc::clone(&generators))
    })
}

fn sequences<T: Value>(generators: Arc<Vec<ExhaustiveGenerator<T>>>) -> Box<dyn Iterator<Item = Vec<T>>> {
    let mut combined: Box<dyn Iterator<Item = Vec<T>>> = Box::new(std::iter::once(Vec::new()));
    for generator in generators.iter().cloned() {
        combined = Box::new(combined.flat_map(move |prefix| {
            generator.iter().map(move |value| {
                let mut next = prefix.clone();
                next.push(value);
                next
            })
        }));
    }
    combined
}

/// All values of each generator in turn.
pub fn chain<T: Value>(
    generators: Vec<ExhaustiveGenerator<T>>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<T>> {
    let max_count = generators
        .iter()
        .try_fold(0u64, |count, g| count.checked_add(g.max_count()))?;
    let generators = Arc::new(generators);
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        let generators = Arc::clone(&generators);
        Box::new((0..generators.len()).flat_map(move |i| {
            generators.get(i).map(|g| g.iter()).into_iter().flatten()
        }))
    })
}

/// Lists of every size from `min_size` to `max_size`, shortest first, each
/// size in lexicographic order of the element enumeration.
pub fn list<T: Value>(
    element: &ExhaustiveGenerator<T>,
    min_size: usize,
    max_size: usize,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let elements = element.max_count();
    // Without elements only the empty list exists.
    let max_size = if elements == 0 { 0 } else { max_size };
    let max_count = if elements == 1 {
        // One list per size, the count no longer grows with the size.
        let sizes = max_size.checked_sub(min_size).map_or(0, |span| span as u64 + 1);
        if sizes > max_samples {
            return None;
        }
        sizes
    } else {
        let mut max_count: u64 = 0;
        for size in min_size..=max_size {
            max_count = max_count.checked_add(checked_power(elements, size)?)?;
            if max_count > max_samples {
                return None;
            }
        }
        max_count
    };
    let element = element.clone();
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        let element = element.clone();
        Box::new((min_size..=max_size).flat_map(move |size| {
            sequences(Arc::new(vec![element.clone(); size]))
        }))
    })
}

/// Subsets of the element enumeration with `min_size` to `max_size`
/// members, smallest first. Element values are assumed distinct.
pub fn subsets<T: Value>(
    element: &ExhaustiveGenerator<T>,
    min_size: usize,
    max_size: usize,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let available = element.max_count();
    let max_size = max_size.min(usize::try_from(available).unwrap_or(usize::MAX));
    let mut max_count: u64 = 0;
    for size in min_size..=max_size {
        max_count = max_count.checked_add(binomial(available, size as u64)?)?;
        if max_count > max_samples {
            return None;
        }
    }
    let element = element.clone();
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        let values: Arc<Vec<T>> = Arc::new(element.iter().collect());
        let largest = max_size.min(values.len());
        Box::new((min_size..=largest).flat_map(move |size| {
            let values = Arc::clone(&values);
            Combinations::new(values.len(), size)
                .map(move |indices| indices.iter().filter_map(|i| values.get(*i).cloned()).collect())
        }))
    })
}

/// Every ordering of `values`, in lexicographic order of positions.
pub fn permutations<T: Value>(values: Vec<T>, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let max_count = (1..=values.len() as u64).try_fold(1u64, |acc, n| acc.checked_mul(n))?;
    let values = Arc::new(values);
    ExhaustiveGenerator::new(max_count, max_samples, move || {
        let values = Arc::clone(&values);
        let mut indices: Option<Vec<usize>> = Some((0..values.len()).collect());
        Box::new(std::iter::from_fn(move || {
            let current = indices.take()?;
            let permuted = current.iter().filter_map(|i| values.get(*i).cloned()).collect();
            indices = next_permutation(current);
            Some(permuted)
        }))
    })
}

fn next_permutation(mut indices: Vec<usize>) -> Option<Vec<usize>> {
    let pivot = (1..indices.len()).rev().find(|&i| indices[i - 1] < indices[i])? - 1;
    let successor = (pivot + 1..indices.len()).rev().find(|&i| indices[i] > indices[pivot])?;
    indices.swap(pivot, successor);
    indices[pivot + 1..].reverse();
    Some(indices)
}

/// Index combinations of `size` out of `n` in lexicographic order.
struct Combinations {
    n: usize,
    indices: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, size: usize) -> Self {
        Self {
            n,
            indices: (size <= n).then(|| (0..size).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.indices.take()?;
        let size = current.len();
        let mut next = current.clone();
        if let Some(i) = (0..size).rev().find(|&i| next[i] < self.n - size + i) {
            next[i] += 1;
            for j in i + 1..size {
                next[j] = next[j - 1] + 1;
            }
            self.indices = Some(next);
        }
        Some(current)
    }
}

fn checked_power(base: u64, exponent: usize) -> Option<u64> {
    match base {
        0 => Some(if exponent == 0 { 1 } else { 0 }),
        1 => Some(1),
        _ => (0..exponent).try_fold(1u64, |acc, _| acc.checked_mul(base)),
    }
}

fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return None;
        }
    }
    Some(result as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(n: i32) -> ExhaustiveGenerator<i32> {
        ExhaustiveGenerator::from_values((0..n).collect(), MAXIMUM_SAMPLES_TO_GENERATE).unwrap()
    }

    #[test]
    fn test_ceiling_is_respected() {
        assert!(ExhaustiveGenerator::from_values(vec![1, 2, 3], 2).is_none());
        let generator = ExhaustiveGenerator::from_values(vec![1, 2, 3], 3).unwrap();
        assert_eq!(generator.max_count(), 3);
        assert_eq!(generator.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_iteration_is_replayable() {
        let generator = digits(4).map(|n| n * 10);
        assert_eq!(generator.iter().collect::<Vec<_>>(), generator.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_keeps_upper_bound() {
        let generator = digits(10).filter(|n| n % 3 == 0);
        assert_eq!(generator.max_count(), 10);
        assert_eq!(generator.iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_inject_null_appends_none() {
        let generator = digits(2).inject_null(10).unwrap();
        assert_eq!(generator.max_count(), 3);
        assert_eq!(generator.iter().collect::<Vec<_>>(), vec![Some(0), Some(1), None]);
        assert!(digits(2).inject_null(2).is_none());
    }

    #[test]
    fn test_list_sizes_and_order() {
        let generator = list(&digits(2), 0, 2, 100).unwrap();
        assert_eq!(generator.max_count(), 7);
        let lists: Vec<Vec<i32>> = generator.iter().collect();
        assert_eq!(
            lists,
            vec![
                vec![],
                vec![0],
                vec![1],
                vec![0, 0],
                vec![0, 1],
                vec![1, 0],
                vec![1, 1],
            ]
        );
    }

    #[test]
    fn test_list_count_overflow_is_rejected() {
        assert!(list(&digits(10), 0, 255, MAXIMUM_SAMPLES_TO_GENERATE).is_none());
        assert!(list(&digits(3), 0, 3, 39).is_none());
        assert_eq!(list(&digits(3), 0, 3, 40).unwrap().max_count(), 40);
    }

    #[test]
    fn test_unbounded_lists_of_tiny_domains() {
        let empty = list(&digits(0), 0, usize::MAX, 100).unwrap();
        assert_eq!(empty.max_count(), 1);
        assert_eq!(empty.iter().collect::<Vec<_>>(), vec![Vec::<i32>::new()]);
        assert_eq!(list(&digits(0), 1, usize::MAX, 100).unwrap().max_count(), 0);

        let single = list(&digits(1), 0, 2, 100).unwrap();
        assert_eq!(single.iter().collect::<Vec<_>>(), vec![vec![], vec![0], vec![0, 0]]);
        assert!(list(&digits(1), 0, usize::MAX, 100).is_none());
        assert_eq!(list(&digits(1), 5, 104, 100).unwrap().max_count(), 100);

        let few = subsets(&digits(3), 0, usize::MAX, 100).unwrap();
        assert_eq!(few.max_count(), 8);
    }

    #[test]
    fn test_combine_and_product() {
        let combined = combine(vec![digits(2), digits(3)], 100).unwrap();
        assert_eq!(combined.max_count(), 6);
        assert_eq!(
            combined.iter().collect::<Vec<_>>(),
            vec![vec![0, 0], vec![0, 1], vec![0, 2], vec![1, 0], vec![1, 1], vec![1, 2]]
        );

        let pairs = product(&digits(2), &digits(2).map(|n| n == 1), 100).unwrap();
        assert_eq!(
            pairs.iter().collect::<Vec<_>>(),
            vec![(0, false), (0, true), (1, false), (1, true)]
        );
        assert!(product(&digits(10), &digits(10), 99).is_none());
    }

    #[test]
    fn test_flat_map_sums_counts() {
        let generator = digits(4)
            .flat_map(|n| ExhaustiveGenerator::from_values((0..n).collect(), 100), 100)
            .unwrap();
        assert_eq!(generator.max_count(), 6);
        assert_eq!(generator.iter().collect::<Vec<_>>(), vec![0, 0, 1, 0, 1, 2]);

        let unavailable = digits(4).flat_map(
            |n| ExhaustiveGenerator::from_values((0..n).collect(), 2),
            100,
        );
        assert!(unavailable.is_none());
    }

    #[test]
    fn test_subsets() {
        let generator = subsets(&digits(4), 0, 2, 100).unwrap();
        assert_eq!(generator.max_count(), 1 + 4 + 6);
        let all: Vec<Vec<i32>> = generator.iter().collect();
        assert_eq!(all.len(), 11);
        assert_eq!(all[0], Vec::<i32>::new());
        assert_eq!(all[5], vec![0, 1]);
        assert_eq!(all[10], vec![2, 3]);
    }

    #[test]
    fn test_permutations() {
        let generator = permutations(vec!['a', 'b', 'c'], 100).unwrap();
        assert_eq!(generator.max_count(), 6);
        let all: Vec<String> = generator.iter().map(|p| p.into_iter().collect()).collect();
        assert_eq!(all, vec!["abc", "acb", "bac", "bca", "cab", "cba"]);
        assert!(permutations((0..30).collect::<Vec<i32>>(), MAXIMUM_SAMPLES_TO_GENERATE).is_none());
    }

    #[test]
    fn test_chain() {
        let generator = chain(vec![digits(2), digits(3)], 100).unwrap();
        assert_eq!(generator.max_count(), 5);
        assert_eq!(generator.iter().collect::<Vec<_>>(), vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(5, 7), Some(0));
        assert_eq!(binomial(64, 32), Some(1_832_624_140_942_590_534));
        assert_eq!(binomial(200, 100), None);
    }
}
