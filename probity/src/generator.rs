//! Random generators producing shrinkable values.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rand::{Rng, RngCore};
use tracing::{debug, trace};

use crate::collections::CollectShrinkable;
use crate::config::EdgeCasesMode;
use crate::edge_cases::EdgeCases;
use crate::error::GenerationError;
use crate::shrinkable::{FlatMapped, Shrinkable, Value};

/// Maximum number of elements drawn while waiting for a collect condition.
pub const MAX_COLLECT_DRAWS: usize = 10_000;

/// Number of recent values remembered for duplicate injection.
pub const DUPLICATES_HISTORY_SIZE: usize = 100;

/// `probability` limited to `0.0..=1.0`. NaN counts as zero.
pub(crate) fn probability_of(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

type NextFn<T> = dyn Fn(&mut dyn RngCore) -> Result<Shrinkable<T>, GenerationError> + Send + Sync;

/// Produces a fresh [`Shrinkable`] from a random source on every call.
///
/// Generators are cheap to clone and may be shared between threads.
pub struct RandomGenerator<T> {
    next: Arc<NextFn<T>>,
}

impl<T> Clone for RandomGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            next: Arc::clone(&self.next),
        }
    }
}

impl<T: Value> RandomGenerator<T> {
    pub fn new<F>(next: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> Result<Shrinkable<T>, GenerationError> + Send + Sync + 'static,
    {
        Self {
            next: Arc::new(next),
        }
    }

    /// Always produces the same unshrinkable value.
    pub fn constant(value: T) -> Self {
        Self::new(move |_| Ok(Shrinkable::unshrinkable(value.clone())))
    }

    /// Always fails with `error`.
    pub fn fail(error: GenerationError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn next(&self, rng: &mut dyn RngCore) -> Result<Shrinkable<T>, GenerationError> {
        (self.next)(rng)
    }

    /// Endless stream of draws from `rng`.
    pub fn stream<'a>(
        &'a self,
        rng: &'a mut dyn RngCore,
    ) -> impl Iterator<Item = Result<Shrinkable<T>, GenerationError>> + 'a {
        std::iter::repeat_with(move || self.next(rng))
    }

    pub fn map<U, F>(&self, mapper: F) -> RandomGenerator<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_with(Arc::new(mapper))
    }

    pub(crate) fn map_with<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> RandomGenerator<U> {
        let source = self.clone();
        RandomGenerator::new(move |rng| Ok(source.next(rng)?.map_with(Arc::clone(&mapper))))
    }

    /// Transforms every drawn shrinkable.
    pub fn map_shrinkable<U, F>(&self, mapper: F) -> RandomGenerator<U>
    where
        U: Value,
        F: Fn(Shrinkable<T>) -> Shrinkable<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        RandomGenerator::new(move |rng| source.next(rng).map(&mapper))
    }

    /// Draws a value, then draws from the generator `mapper` returns for it.
    ///
    /// The dependent draw uses its own seed taken from `rng`, so shrinking
    /// the first value regenerates a comparable dependent value.
    pub fn flat_map<U, F>(&self, mapper: F) -> RandomGenerator<U>
    where
        U: Value,
        F: Fn(T) -> RandomGenerator<U> + Send + Sync + 'static,
    {
        self.flat_map_with(Arc::new(mapper))
    }

    pub(crate) fn flat_map_with<U: Value>(
        &self,
        generators: Arc<dyn Fn(T) -> RandomGenerator<U> + Send + Sync>,
    ) -> RandomGenerator<U> {
        let source = self.clone();
        RandomGenerator::new(move |rng| {
            let outer = source.next(rng)?;
            let seed = rng.next_u64();
            FlatMapped::generate(outer, Arc::clone(&generators), seed).map(Shrinkable::new)
        })
    }

    /// Redraws until `predicate` holds, failing after `max_misses`
    /// consecutive rejections.
    pub fn filter<F>(&self, predicate: F, max_misses: usize) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_labeled(std::any::type_name::<F>(), predicate, max_misses)
    }

    /// Like [`RandomGenerator::filter`], naming the filter in errors.
    pub fn filter_labeled<F>(&self, label: impl Into<String>, predicate: F, max_misses: usize) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let label = label.into();
        self.filter_with(Arc::new(predicate), max_misses, move |misses| {
            GenerationError::TooManyFilterMisses {
                filter: label.clone(),
                misses,
                max_misses,
            }
        })
    }

    pub(crate) fn filter_with<E>(
        &self,
        predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
        max_misses: usize,
        exhausted: E,
    ) -> Self
    where
        E: Fn(usize) -> GenerationError + Send + Sync + 'static,
    {
        let source = self.clone();
        Self::new(move |rng| {
            let mut misses = 0;
            loop {
                let candidate = source.next(rng)?;
                if predicate(&candidate.value()) {
                    return Ok(candidate.filter_with(Arc::clone(&predicate)));
                }
                misses += 1;
                if misses >= max_misses {
                    let error = exhausted(misses);
                    debug!(misses, %error, "filter exhausted");
                    return Err(error);
                }
            }
        })
    }

    /// Produces every edge case once before drawing random values.
    ///
    /// At most `gen_size` edge cases are injected.
    pub fn with_edge_cases(&self, gen_size: u32, edge_cases: EdgeCases<T>) -> Self {
        self.with_edge_cases_mode(gen_size, edge_cases, EdgeCasesMode::First)
    }

    pub fn with_edge_cases_mode(&self, gen_size: u32, edge_cases: EdgeCases<T>, mode: EdgeCasesMode) -> Self {
        if mode == EdgeCasesMode::None || edge_cases.is_empty() {
            return self.clone();
        }
        let injected: Arc<Vec<Shrinkable<T>>> = Arc::new(
            edge_cases
                .into_shrinkables()
                .into_iter()
                .take(gen_size as usize)
                .collect(),
        );
        let draws = AtomicUsize::new(0);
        let source = self.clone();
        Self::new(move |rng| {
            let draw = draws.fetch_add(1, Ordering::Relaxed);
            let index = match mode {
                EdgeCasesMode::First => Some(draw),
                EdgeCasesMode::Mixin => (draw % 2 == 0).then_some(draw / 2),
                EdgeCasesMode::None => None,
            };
            if let Some(edge_case) = index.and_then(|i| injected.get(i)) {
                trace!(draw, "injecting edge case");
                return Ok(edge_case.clone());
            }
            source.next(rng)
        })
    }

    /// Draws values until `until` holds for the collected list.
    pub fn collect<F>(&self, until: F) -> RandomGenerator<Vec<T>>
    where
        F: Fn(&[T]) -> bool + Send + Sync + 'static,
    {
        let until: Arc<dyn Fn(&[T]) -> bool + Send + Sync> = Arc::new(until);
        let source = self.clone();
        RandomGenerator::new(move |rng| {
            let mut elements = Vec::new();
            let mut values = Vec::new();
            while !until(&values) {
                if elements.len() >= MAX_COLLECT_DRAWS {
                    return Err(GenerationError::TooManyCollectDraws {
                        draws: elements.len(),
                    });
                }
                let element = source.next(rng)?;
                values.push(element.value());
                elements.push(element);
            }
            Ok(Shrinkable::new(CollectShrinkable::new(
                elements,
                Arc::clone(&until),
            )))
        })
    }

    /// With probability `probability`, repeats one of the recently drawn
    /// values instead of drawing a new one.
    pub fn inject_duplicates(&self, probability: f64) -> Self {
        let probability = probability_of(probability);
        let history: Arc<Mutex<VecDeque<Shrinkable<T>>>> = Arc::new(Mutex::new(VecDeque::new()));
        let source = self.clone();
        Self::new(move |rng| {
            {
                let previous = history.lock().unwrap_or_else(PoisonError::into_inner);
                if !previous.is_empty() && rng.gen_bool(probability) {
                    let index = rng.gen_range(0..previous.len());
                    if let Some(duplicate) = previous.get(index) {
                        return Ok(duplicate.clone());
                    }
                }
            }
            let fresh = source.next(rng)?;
            let mut previous = history.lock().unwrap_or_else(PoisonError::into_inner);
            previous.push_back(fresh.clone());
            if previous.len() > DUPLICATES_HISTORY_SIZE {
                previous.pop_front();
            }
            Ok(fresh)
        })
    }

    /// Redraws when generation fails with a user error of type `E`.
    pub fn ignore_error<E>(&self, max_misses: usize) -> Self
    where
        E: std::error::Error + 'static,
    {
        let source = self.clone();
        Self::new(move |rng| {
            let mut misses = 0;
            loop {
                match source.next(rng) {
                    Err(error) if error.is_user_error::<E>() => {
                        misses += 1;
                        if misses >= max_misses {
                            return Err(GenerationError::TooManyFilterMisses {
                                filter: format!("ignore_exception<{}>", std::any::type_name::<E>()),
                                misses,
                                max_misses,
                            });
                        }
                    }
                    other => return other,
                }
            }
        })
    }

    /// Drawn values keep their distance but never shrink.
    pub fn dont_shrink(&self) -> Self {
        self.map_shrinkable(|shrinkable| shrinkable.make_unshrinkable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries::integers;
    use crate::arbitrary::Arbitrary;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("odd value")]
    struct OddValue;

    fn ints(min: i32, max: i32) -> RandomGenerator<i32> {
        integers::<i32>().between(min, max).generator(1000)
    }

    #[test]
    fn test_filter_gives_up_after_exactly_max_misses() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let generator = ints(0, 100).filter_labeled(
            "never",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            },
            5,
        );

        let mut rng = StdRng::seed_from_u64(1);
        let error = generator.next(&mut rng).unwrap_err();
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        match error {
            GenerationError::TooManyFilterMisses {
                filter,
                misses,
                max_misses,
            } => {
                assert_eq!(filter, "never");
                assert_eq!(misses, 5);
                assert_eq!(max_misses, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filtered_values_and_shrinks_satisfy_predicate() {
        let generator = ints(-1000, 1000).filter(|n| n % 2 == 0, 100);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let shrinkable = generator.next(&mut rng).unwrap();
            assert_eq!(shrinkable.value() % 2, 0);
            for candidate in shrinkable.shrink().take(20) {
                assert_eq!(candidate.value() % 2, 0);
            }
        }
    }

    #[test]
    fn test_edge_cases_come_first() {
        let generator = ints(0, 1_000_000).with_edge_cases(100, EdgeCases::from_values([7, 8, 9]));
        let mut rng = StdRng::seed_from_u64(3);
        let drawn: Vec<i32> = (0..3).map(|_| generator.next(&mut rng).unwrap().value()).collect();
        assert_eq!(drawn, vec![7, 8, 9]);
    }

    #[test]
    fn test_edge_cases_capped_by_gen_size() {
        let generator = RandomGenerator::constant(0).with_edge_cases(2, EdgeCases::from_values([7, 8, 9]));
        let mut rng = StdRng::seed_from_u64(3);
        let drawn: Vec<i32> = (0..4).map(|_| generator.next(&mut rng).unwrap().value()).collect();
        assert_eq!(drawn, vec![7, 8, 0, 0]);
    }

    #[test]
    fn test_mixin_alternates_edge_cases() {
        let generator = RandomGenerator::constant(0).with_edge_cases_mode(
            100,
            EdgeCases::from_values([7, 8]),
            EdgeCasesMode::Mixin,
        );
        let mut rng = StdRng::seed_from_u64(3);
        let drawn: Vec<i32> = (0..6).map(|_| generator.next(&mut rng).unwrap().value()).collect();
        assert_eq!(drawn, vec![7, 0, 8, 0, 0, 0]);
    }

    #[test]
    fn test_edge_cases_mode_none() {
        let generator = RandomGenerator::constant(0).with_edge_cases_mode(
            100,
            EdgeCases::from_values([7]),
            EdgeCasesMode::None,
        );
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(generator.next(&mut rng).unwrap().value(), 0);
    }

    #[test]
    fn test_collect_until_sum_reached() {
        let generator = ints(1, 10).collect(|values: &[i32]| values.iter().sum::<i32>() >= 30);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let values = generator.next(&mut rng).unwrap().value();
            let sum: i32 = values.iter().sum();
            assert!(sum >= 30);
            assert!(sum - values[values.len() - 1] < 30);
        }
    }

    #[test]
    fn test_collect_gives_up() {
        let generator = RandomGenerator::constant(0).collect(|values: &[i32]| values.iter().sum::<i32>() > 0);
        let mut rng = StdRng::seed_from_u64(11);
        assert!(matches!(
            generator.next(&mut rng),
            Err(GenerationError::TooManyCollectDraws { draws: MAX_COLLECT_DRAWS })
        ));
    }

    #[test]
    fn test_inject_duplicates_always() {
        let generator = ints(0, i32::MAX).inject_duplicates(1.0);
        let mut rng = StdRng::seed_from_u64(2);
        let first = generator.next(&mut rng).unwrap().value();
        for _ in 0..10 {
            assert_eq!(generator.next(&mut rng).unwrap().value(), first);
        }
    }

    #[test]
    fn test_inject_duplicates_sometimes() {
        let generator = ints(0, i32::MAX).inject_duplicates(0.5);
        let mut rng = StdRng::seed_from_u64(2);
        let values: Vec<i32> = (0..200).map(|_| generator.next(&mut rng).unwrap().value()).collect();
        let mut unique = values.clone();
        unique.sort();
        unique.dedup();
        assert!(unique.len() < values.len());
        assert!(unique.len() > 1);
    }

    #[test]
    fn test_ignore_error_retries() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let failing = RandomGenerator::<i32>::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(GenerationError::user(OddValue))
            } else {
                Ok(Shrinkable::unshrinkable(4))
            }
        });
        let mut rng = StdRng::seed_from_u64(2);
        let value = failing.ignore_error::<OddValue>(10).next(&mut rng).unwrap().value();
        assert_eq!(value, 4);
        assert_eq!(attempts.load(Ordering::SeqCst), 4);

        let always = RandomGenerator::<i32>::fail(GenerationError::user(OddValue));
        assert!(matches!(
            always.ignore_error::<OddValue>(3).next(&mut rng),
            Err(GenerationError::TooManyFilterMisses { misses: 3, .. })
        ));

        let other = RandomGenerator::<i32>::fail(GenerationError::value_unavailable("empty"));
        assert!(matches!(
            other.ignore_error::<OddValue>(3).next(&mut rng),
            Err(GenerationError::ValueUnavailable { .. })
        ));
    }

    #[test]
    fn test_dont_shrink() {
        let generator = ints(100, 200).dont_shrink();
        let mut rng = StdRng::seed_from_u64(9);
        let shrinkable = generator.next(&mut rng).unwrap();
        assert_eq!(shrinkable.shrink().count(), 0);
    }

    #[test]
    fn test_flat_map_dependent_values() {
        let generator = ints(1, 20).flat_map(|n| ints(0, n));
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..30 {
            let shrinkable = generator.next(&mut rng).unwrap();
            let value = shrinkable.value();
            assert!((0..=20).contains(&value));
            for candidate in shrinkable.shrink().take(30) {
                assert!(candidate.distance() <= shrinkable.distance());
            }
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let generator = ints(-1000, 1000).map(|n| n * 3);
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| generator.next(&mut rng).unwrap().value())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(77), draw(77));
    }
}
