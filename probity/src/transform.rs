//! Arbitraries that wrap another arbitrary and transform what it produces.

use std::error::Error as StdError;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;

use crate::arbitrary::{Arbitrary, current_max_misses};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::{EdgeCases, EdgeCasesConfig};
use crate::error::GenerationError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::{RandomGenerator, probability_of};
use crate::shrinkable::{ShrinkStream, Shrinkable, ShrinkableNode, Value};

type Mapper<T, U> = Arc<dyn Fn(T) -> U + Send + Sync>;
type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Arbitrary mapped with a function, see [`Arbitrary::map`].
pub struct Map<A: Arbitrary, U> {
    source: A,
    mapper: Mapper<A::Value, U>,
}

impl<A: Arbitrary, U: Value> Map<A, U> {
    pub(crate) fn new(source: A, mapper: Mapper<A::Value, U>) -> Self {
        Self { source, mapper }
    }
}

impl<A: Arbitrary, U: Value> Arbitrary for Map<A, U> {
    type Value = U;

    fn generator(&self, gen_size: u32) -> RandomGenerator<U> {
        self.source.generator(gen_size).map_with(Arc::clone(&self.mapper))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<U> {
        self.source
            .generator_with_embedded_edge_cases(gen_size)
            .map_with(Arc::clone(&self.mapper))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        self.source
            .exhaustive(max_samples)
            .map(|exhaustive| exhaustive.map_with(Arc::clone(&self.mapper)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        self.source
            .edge_cases(max_edge_cases)
            .map_with(Arc::clone(&self.mapper))
    }
}

/// Arbitrary mapped with a fallible function, see [`Arbitrary::try_map`].
pub struct TryMap<A: Arbitrary, U> {
    source: A,
    mapper: Mapper<A::Value, Result<U, GenerationError>>,
}

impl<A: Arbitrary, U: Value> TryMap<A, U> {
    pub(crate) fn new(source: A, mapper: Mapper<A::Value, Result<U, GenerationError>>) -> Self {
        Self { source, mapper }
    }

    fn mapped(&self, generator: RandomGenerator<A::Value>) -> RandomGenerator<U> {
        let mapper = Arc::clone(&self.mapper);
        RandomGenerator::new(move |rng| TryMapped::wrap(generator.next(rng)?, &mapper))
    }
}

impl<A: Arbitrary, U: Value> Arbitrary for TryMap<A, U> {
    type Value = U;

    fn generator(&self, gen_size: u32) -> RandomGenerator<U> {
        self.mapped(self.source.generator(gen_size))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<U> {
        self.mapped(self.source.generator_with_embedded_edge_cases(gen_size))
    }

    /// Values whose mapping fails are left out.
    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        let mapper = Arc::clone(&self.mapper);
        self.source
            .exhaustive(max_samples)
            .map(|exhaustive| exhaustive.filter_map_with(Arc::new(move |value| mapper(value).ok())))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        EdgeCases::from_shrinkables(
            self.source
                .edge_cases(max_edge_cases)
                .into_shrinkables()
                .into_iter()
                .filter_map(|edge_case| TryMapped::wrap(edge_case, &self.mapper).ok()),
        )
    }
}

struct TryMapped<T, U> {
    source: Shrinkable<T>,
    mapper: Mapper<T, Result<U, GenerationError>>,
    value: U,
}

impl<T: Value, U: Value> TryMapped<T, U> {
    fn wrap(
        source: Shrinkable<T>,
        mapper: &Mapper<T, Result<U, GenerationError>>,
    ) -> Result<Shrinkable<U>, GenerationError> {
        let value = mapper(source.value())?;
        Ok(Shrinkable::new(TryMapped {
            source,
            mapper: Arc::clone(mapper),
            value,
        }))
    }
}

impl<T: Value, U: Value> ShrinkableNode<U> for TryMapped<T, U> {
    fn value(&self) -> U {
        self.value.clone()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkStream<U> {
        let mapper = Arc::clone(&self.mapper);
        Box::new(
            self.source
                .shrink()
                .filter_map(move |candidate| TryMapped::wrap(candidate, &mapper).ok()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterKind {
    Values,
    Combinations,
}

/// Arbitrary restricted by a predicate, see [`Arbitrary::filter`].
pub struct Filter<A: Arbitrary> {
    source: A,
    label: String,
    predicate: Predicate<A::Value>,
    max_misses: Option<usize>,
    kind: FilterKind,
}

impl<A: Arbitrary> Filter<A> {
    pub(crate) fn new(
        source: A,
        label: impl Into<String>,
        predicate: Predicate<A::Value>,
        max_misses: Option<usize>,
    ) -> Self {
        Self {
            source,
            label: label.into(),
            predicate,
            max_misses,
            kind: FilterKind::Values,
        }
    }

    /// Filter over combined values, reporting exhaustion as an
    /// unsatisfiable combination.
    pub(crate) fn combinations(source: A, predicate: Predicate<A::Value>, max_misses: Option<usize>) -> Self {
        Self {
            source,
            label: "combination".to_string(),
            predicate,
            max_misses,
            kind: FilterKind::Combinations,
        }
    }

    fn filtered(&self, generator: RandomGenerator<A::Value>) -> RandomGenerator<A::Value> {
        let max_misses = self.max_misses.unwrap_or_else(current_max_misses);
        let predicate = Arc::clone(&self.predicate);
        match self.kind {
            FilterKind::Values => {
                let label = self.label.clone();
                generator.filter_with(predicate, max_misses, move |misses| {
                    GenerationError::TooManyFilterMisses {
                        filter: label.clone(),
                        misses,
                        max_misses,
                    }
                })
            }
            FilterKind::Combinations => generator.filter_with(predicate, max_misses, move |misses| {
                GenerationError::UnsatisfiableCombination { misses, max_misses }
            }),
        }
    }
}

impl<A: Arbitrary> Arbitrary for Filter<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.filtered(self.source.generator(gen_size))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.filtered(self.source.generator_with_embedded_edge_cases(gen_size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source
            .exhaustive(max_samples)
            .map(|exhaustive| exhaustive.filter_with(Arc::clone(&self.predicate)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.source
            .edge_cases(max_edge_cases)
            .filter_with(Arc::clone(&self.predicate))
    }

    fn edge_case_for(&self, value: A::Value) -> Shrinkable<A::Value> {
        self.source
            .edge_case_for(value)
            .filter_with(Arc::clone(&self.predicate))
    }
}

/// Dependent arbitrary, see [`Arbitrary::flat_map`].
pub struct FlatMap<A: Arbitrary, B> {
    source: A,
    mapper: Mapper<A::Value, B>,
}

impl<A: Arbitrary, B: Arbitrary> FlatMap<A, B> {
    pub(crate) fn new(source: A, mapper: Mapper<A::Value, B>) -> Self {
        Self { source, mapper }
    }
}

impl<A: Arbitrary, B: Arbitrary> Arbitrary for FlatMap<A, B> {
    type Value = B::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<B::Value> {
        let mapper = Arc::clone(&self.mapper);
        self.source
            .generator(gen_size)
            .flat_map_with(Arc::new(move |value| mapper(value).generator(gen_size)))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<B::Value> {
        let mapper = Arc::clone(&self.mapper);
        self.source
            .generator_with_embedded_edge_cases(gen_size)
            .flat_map_with(Arc::new(move |value| {
                mapper(value).generator_with_edge_cases(gen_size, true)
            }))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<B::Value>> {
        let mapper = Arc::clone(&self.mapper);
        self.source
            .exhaustive(max_samples)?
            .flat_map(move |value| mapper(value).exhaustive(max_samples), max_samples)
    }
}

/// Arbitrary that sometimes produces `None`, see [`Arbitrary::inject_null`].
pub struct InjectNull<A> {
    source: A,
    probability: f64,
}

impl<A: Arbitrary> InjectNull<A> {
    pub(crate) fn new(source: A, probability: f64) -> Self {
        Self {
            source,
            probability: probability_of(probability),
        }
    }

    fn injected(&self, generator: RandomGenerator<A::Value>) -> RandomGenerator<Option<A::Value>> {
        let probability = self.probability;
        RandomGenerator::new(move |rng| {
            if rng.gen_bool(probability) {
                return Ok(Shrinkable::unshrinkable(None));
            }
            Ok(Shrinkable::new(Present {
                inner: generator.next(rng)?,
            }))
        })
    }
}

impl<A: Arbitrary> Arbitrary for InjectNull<A> {
    type Value = Option<A::Value>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.injected(self.source.generator(gen_size))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.injected(self.source.generator_with_embedded_edge_cases(gen_size))
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let exhaustive = self.source.exhaustive(max_samples)?;
        if self.probability > 0.0 {
            exhaustive.inject_null(max_samples)
        } else {
            Some(exhaustive.map(Some))
        }
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        let none = (self.probability > 0.0).then(|| Shrinkable::unshrinkable(None));
        let present = self
            .source
            .edge_cases(max_edge_cases)
            .into_shrinkables()
            .into_iter()
            .map(|inner| Shrinkable::new(Present { inner }));
        EdgeCases::from_shrinkables(none.into_iter().chain(present)).limit(max_edge_cases)
    }
}

/// A present optional value. Shrinks to `None` first.
struct Present<T> {
    inner: Shrinkable<T>,
}

impl<T: Value> ShrinkableNode<Option<T>> for Present<T> {
    fn value(&self) -> Option<T> {
        Some(self.inner.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::of(1).append(&self.inner.distance())
    }

    fn shrink(&self) -> ShrinkStream<Option<T>> {
        Box::new(
            std::iter::once(Shrinkable::unshrinkable(None))
                .chain(self.inner.shrink().map(|inner| Shrinkable::new(Present { inner }))),
        )
    }
}

/// Arbitrary ignoring the run's size hint, see [`Arbitrary::fix_gen_size`].
pub struct FixGenSize<A> {
    source: A,
    gen_size: u32,
}

impl<A: Arbitrary> FixGenSize<A> {
    pub(crate) fn new(source: A, gen_size: u32) -> Self {
        Self { source, gen_size }
    }
}

impl<A: Arbitrary> Arbitrary for FixGenSize<A> {
    type Value = A::Value;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator(self.gen_size)
    }

    fn generator_with_embedded_edge_cases(&self, _gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator_with_embedded_edge_cases(self.gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.source.edge_cases(max_edge_cases)
    }

    fn edge_case_for(&self, value: A::Value) -> Shrinkable<A::Value> {
        self.source.edge_case_for(value)
    }
}

/// Lists collected until a condition holds, see [`Arbitrary::collect`].
pub struct Collect<A: Arbitrary> {
    source: A,
    until: Arc<dyn Fn(&[A::Value]) -> bool + Send + Sync>,
}

impl<A: Arbitrary> Collect<A> {
    pub(crate) fn new(source: A, until: Arc<dyn Fn(&[A::Value]) -> bool + Send + Sync>) -> Self {
        Self { source, until }
    }
}

impl<A: Arbitrary> Arbitrary for Collect<A> {
    type Value = Vec<A::Value>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Vec<A::Value>> {
        let until = Arc::clone(&self.until);
        self.source
            .generator(gen_size)
            .collect(move |values| until(values))
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Vec<A::Value>> {
        let until = Arc::clone(&self.until);
        self.source
            .generator_with_edge_cases(gen_size, true)
            .collect(move |values| until(values))
    }
}

/// Arbitrary repeating earlier values, see [`Arbitrary::inject_duplicates`].
///
/// Has no edge cases while duplicates are injected.
pub struct InjectDuplicates<A> {
    source: A,
    probability: f64,
}

impl<A: Arbitrary> InjectDuplicates<A> {
    pub(crate) fn new(source: A, probability: f64) -> Self {
        Self {
            source,
            probability: probability_of(probability),
        }
    }
}

impl<A: Arbitrary> Arbitrary for InjectDuplicates<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source
            .generator(gen_size)
            .inject_duplicates(self.probability)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source
            .generator_with_embedded_edge_cases(gen_size)
            .inject_duplicates(self.probability)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        if self.probability > 0.0 {
            EdgeCases::none()
        } else {
            self.source.edge_cases(max_edge_cases)
        }
    }
}

/// Arbitrary retrying failed mappings, see [`Arbitrary::ignore_exception`].
pub struct IgnoreException<A, E> {
    source: A,
    _error: PhantomData<fn() -> E>,
}

impl<A: Arbitrary, E: StdError + Send + Sync + 'static> IgnoreException<A, E> {
    pub(crate) fn new(source: A) -> Self {
        Self {
            source,
            _error: PhantomData,
        }
    }
}

impl<A, E> Arbitrary for IgnoreException<A, E>
where
    A: Arbitrary,
    E: StdError + Send + Sync + 'static,
{
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source
            .generator(gen_size)
            .ignore_error::<E>(current_max_misses())
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source
            .generator_with_embedded_edge_cases(gen_size)
            .ignore_error::<E>(current_max_misses())
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        self.source.edge_cases(max_edge_cases)
    }
}

/// Arbitrary whose values never shrink, see [`Arbitrary::dont_shrink`].
pub struct DontShrink<A> {
    source: A,
}

impl<A: Arbitrary> DontShrink<A> {
    pub(crate) fn new(source: A) -> Self {
        Self { source }
    }
}

impl<A: Arbitrary> Arbitrary for DontShrink<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator(gen_size).dont_shrink()
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source
            .generator_with_embedded_edge_cases(gen_size)
            .dont_shrink()
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        EdgeCases::from_shrinkables(
            self.source
                .edge_cases(max_edge_cases)
                .into_shrinkables()
                .into_iter()
                .map(|edge_case| edge_case.make_unshrinkable()),
        )
    }

    fn edge_case_for(&self, value: A::Value) -> Shrinkable<A::Value> {
        Shrinkable::unshrinkable(value)
    }
}

/// Arbitrary with adjusted edge cases, see
/// [`Arbitrary::configure_edge_cases`].
pub struct ConfigureEdgeCases<A: Arbitrary> {
    source: Arc<A>,
    configurator: Arc<dyn Fn(&mut EdgeCasesConfig<A::Value>) + Send + Sync>,
}

impl<A: Arbitrary> ConfigureEdgeCases<A> {
    pub(crate) fn new(
        source: A,
        configurator: Arc<dyn Fn(&mut EdgeCasesConfig<A::Value>) + Send + Sync>,
    ) -> Self {
        Self {
            source: Arc::new(source),
            configurator,
        }
    }
}

impl<A: Arbitrary> Arbitrary for ConfigureEdgeCases<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator(gen_size)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator_with_embedded_edge_cases(gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<A::Value> {
        let source = Arc::clone(&self.source);
        let factory: Arc<dyn Fn(A::Value) -> Shrinkable<A::Value> + Send + Sync> =
            Arc::new(move |value| source.edge_case_for(value));
        let mut config = EdgeCasesConfig::new(self.source.edge_cases(max_edge_cases), factory);
        (self.configurator)(&mut config);
        config.build().limit(max_edge_cases)
    }

    fn edge_case_for(&self, value: A::Value) -> Shrinkable<A::Value> {
        self.source.edge_case_for(value)
    }
}

/// Arbitrary without edge cases, see [`Arbitrary::without_edge_cases`].
pub struct WithoutEdgeCases<A> {
    source: A,
}

impl<A: Arbitrary> WithoutEdgeCases<A> {
    pub(crate) fn new(source: A) -> Self {
        Self { source }
    }
}

impl<A: Arbitrary> Arbitrary for WithoutEdgeCases<A> {
    type Value = A::Value;

    fn generator(&self, gen_size: u32) -> RandomGenerator<A::Value> {
        self.source.generator(gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<A::Value>> {
        self.source.exhaustive(max_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitraries::{integers, just, of};
    use crate::rng::create_seeded_rng;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("{0} is odd")]
    struct Odd(i32);

    fn halve(n: i32) -> Result<i32, Odd> {
        if n % 2 == 0 { Ok(n / 2) } else { Err(Odd(n)) }
    }

    #[test]
    fn test_map_propagates_everything() {
        let arbitrary = integers::<i32>().between(0, 3).map(|n| n * 10);
        assert_eq!(
            arbitrary.all_values().unwrap().collect::<Vec<_>>(),
            vec![0, 10, 20, 30]
        );
        let edge_cases = arbitrary.edge_cases(10).values();
        assert!(edge_cases.contains(&0) && edge_cases.contains(&30));

        let mut rng = create_seeded_rng(8);
        let shrinkable = integers::<i32>()
            .between(100, 200)
            .filter(|n| *n != 100)
            .map(|n| n.to_string())
            .generator(100)
            .next(&mut rng)
            .unwrap();
        let first = shrinkable.shrink().next().unwrap();
        let parsed = |s: String| s.parse::<i32>().unwrap();
        assert!(parsed(first.value()) < parsed(shrinkable.value()));
    }

    #[test]
    fn test_filter_error_and_exhaustive() {
        let arbitrary = integers::<i32>().between(0, 100).filter_with_max_misses(5, |n| *n > 1000);
        let mut rng = create_seeded_rng(8);
        let error = arbitrary.generator(100).next(&mut rng).unwrap_err();
        assert!(matches!(
            error,
            GenerationError::TooManyFilterMisses { misses: 5, max_misses: 5, .. }
        ));

        let even = integers::<i32>().between(0, 6).filter(|n| n % 2 == 0);
        assert_eq!(even.all_values().unwrap().collect::<Vec<_>>(), vec![0, 2, 4, 6]);
        assert!(even.edge_cases(10).values().iter().all(|n| n % 2 == 0));
    }

    #[test]
    fn test_try_map_skips_failures() {
        let arbitrary = integers::<i32>().between(0, 9).try_map(halve);
        assert_eq!(
            arbitrary.all_values().unwrap().collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );

        let mut rng = create_seeded_rng(3);
        let generator = arbitrary.generator(100);
        let mut failures = 0;
        for _ in 0..50 {
            match generator.next(&mut rng) {
                Ok(shrinkable) => {
                    for candidate in shrinkable.shrink() {
                        assert!(candidate.value() <= shrinkable.value());
                    }
                }
                Err(error) => {
                    assert!(error.is_user_error::<Odd>());
                    failures += 1;
                }
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn test_ignore_exception_retries_failed_mappings() {
        let arbitrary = integers::<i32>().between(0, 9).try_map(halve).ignore_exception::<Odd>();
        let mut rng = create_seeded_rng(3);
        let generator = arbitrary.generator(100);
        for _ in 0..50 {
            let value = generator.next(&mut rng).unwrap().value();
            assert!((0..=4).contains(&value));
        }
    }

    #[test]
    fn test_flat_map_exhaustive() {
        let arbitrary = integers::<u8>()
            .between(1, 3)
            .flat_map(|n| integers::<u8>().between(0, n - 1));
        let values: Vec<u8> = arbitrary.all_values().unwrap().collect();
        assert_eq!(values, vec![0, 0, 1, 0, 1, 2]);
        assert!(arbitrary.edge_cases(10).is_empty());
    }

    #[test]
    fn test_flat_map_embedded_edge_cases() {
        let arbitrary = just(50).flat_map(|n| integers::<i32>().between(n, n * 2));
        let mut rng = create_seeded_rng(1);
        let value = arbitrary
            .generator_with_embedded_edge_cases(100)
            .next(&mut rng)
            .unwrap()
            .value();
        let inner_edge_cases = integers::<i32>().between(50, 100).edge_cases(10).values();
        assert_eq!(Some(&value), inner_edge_cases.first());
    }

    #[test]
    fn test_inject_null() {
        let arbitrary = integers::<i32>().between(1, 2).inject_null(0.5);
        assert_eq!(
            arbitrary.all_values().unwrap().collect::<Vec<_>>(),
            vec![Some(1), Some(2), None]
        );
        assert_eq!(arbitrary.edge_cases(10).values().first(), Some(&None));

        let mut rng = create_seeded_rng(4);
        let generator = arbitrary.generator(100);
        let values: Vec<Option<i32>> = (0..100)
            .map(|_| generator.next(&mut rng).unwrap().value())
            .collect();
        assert!(values.contains(&None));
        assert!(values.iter().any(Option::is_some));

        let present = std::iter::repeat_with(|| generator.next(&mut rng).unwrap())
            .find(|shrinkable| shrinkable.value().is_some())
            .unwrap();
        assert_eq!(present.shrink().next().unwrap().value(), None);
    }

    #[test]
    fn test_optional_never_absent_at_full_presence() {
        let arbitrary = integers::<i32>().optional(1.0);
        let mut rng = create_seeded_rng(4);
        let generator = arbitrary.generator(100);
        assert!((0..100).all(|_| generator.next(&mut rng).unwrap().value().is_some()));
        assert!(!arbitrary.edge_cases(10).values().contains(&None));
    }

    #[test]
    fn test_fix_gen_size() {
        let lists = integers::<i32>().list().fix_gen_size(5);
        let draw = |gen_size| {
            let mut rng = create_seeded_rng(4);
            let generator = lists.generator(gen_size);
            (0..20)
                .map(|_| generator.next(&mut rng).unwrap().value())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(10), draw(10_000));
    }

    #[test]
    fn test_nan_probability_never_injects() {
        let mut rng = create_seeded_rng(5);
        let nulls = integers::<i32>().between(1, 9).inject_null(f64::NAN).generator(100);
        let optionals = integers::<i32>().between(1, 9).optional(f64::NAN).generator(100);
        let duplicates = integers::<i32>().inject_duplicates(f64::NAN).generator(100);
        for _ in 0..100 {
            assert!(nulls.next(&mut rng).unwrap().value().is_some());
            assert!(optionals.next(&mut rng).unwrap().value().is_some());
            duplicates.next(&mut rng).unwrap();
        }
    }

    #[test]
    fn test_inject_duplicates_has_no_edge_cases() {
        let arbitrary = integers::<i32>().inject_duplicates(0.5);
        assert!(arbitrary.edge_cases(10).is_empty());
        let unchanged = integers::<i32>().inject_duplicates(0.0);
        assert!(!unchanged.edge_cases(10).is_empty());
    }

    #[test]
    fn test_dont_shrink() {
        let arbitrary = integers::<i32>().between(10, 20).dont_shrink();
        let mut rng = create_seeded_rng(4);
        assert_eq!(arbitrary.generator(100).next(&mut rng).unwrap().shrink().count(), 0);
        for edge_case in arbitrary.edge_cases(10).iter() {
            assert_eq!(edge_case.shrink().count(), 0);
        }
    }

    #[test]
    fn test_configure_edge_cases() {
        let arbitrary = integers::<i32>()
            .between(-100, 100)
            .configure_edge_cases(|config| {
                config.include_only(&[-100, 100]).add(42);
            });
        assert_eq!(arbitrary.edge_cases(10).values(), vec![-100, 100, 42]);

        // Added integers still shrink.
        let added = arbitrary
            .edge_cases(10)
            .iter()
            .find(|e| e.value() == 42)
            .cloned()
            .unwrap();
        assert_eq!(added.shrink().next().unwrap().value(), 0);

        let capped = integers::<i32>().configure_edge_cases(|config| {
            config.add(7);
        });
        assert!(capped.edge_cases(2).len() <= 2);
    }

    #[test]
    fn test_without_edge_cases() {
        let arbitrary = of(vec![1, 2, 3]).without_edge_cases();
        assert!(arbitrary.edge_cases(10).is_empty());
        assert_eq!(arbitrary.all_values().unwrap().count(), 3);
    }

    #[test]
    fn test_collect() {
        let arbitrary = integers::<u32>().between(1, 5).collect(|values: &[u32]| values.len() >= 3);
        let mut rng = create_seeded_rng(4);
        let values = arbitrary.generator(100).next(&mut rng).unwrap().value();
        assert_eq!(values.len(), 3);
        assert!(arbitrary.edge_cases(10).is_empty());
    }
}
