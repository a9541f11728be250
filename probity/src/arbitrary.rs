//! The user-facing description of a family of generators.
//!
//! An [`Arbitrary`] is a factory: for every run it hands out a
//! [`RandomGenerator`], an optional [`ExhaustiveGenerator`] and its
//! [`EdgeCases`]. All combinators allocate a new arbitrary wrapping the old
//! one; see [`crate::transform`] and [`crate::collections`].

use std::cell::Cell;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::collections::{ArrayArbitrary, IterArbitrary, ListArbitrary, SetArbitrary};
use crate::config::EdgeCasesMode;
use crate::edge_cases::{EdgeCases, EdgeCasesConfig};
use crate::error::GenerationError;
use crate::exhaustive::{ExhaustiveGenerator, MAXIMUM_SAMPLES_TO_GENERATE};
use crate::generator::RandomGenerator;
use crate::rng;
use crate::shrinkable::{Shrinkable, Value};
use crate::transform::{
    Collect, ConfigureEdgeCases, DontShrink, Filter, FixGenSize, FlatMap, IgnoreException,
    InjectDuplicates, InjectNull, Map, TryMap, WithoutEdgeCases,
};

/// Default number of consecutive misses a filter tolerates.
pub const DEFAULT_MAX_MISSES: usize = 10_000;

thread_local! {
    static RUN_MAX_MISSES: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Miss budget for filters, unique collections and ignored errors built
/// without an explicit one: the budget of the property run on this thread,
/// [`DEFAULT_MAX_MISSES`] outside of runs.
pub fn current_max_misses() -> usize {
    RUN_MAX_MISSES.with(Cell::get).unwrap_or(DEFAULT_MAX_MISSES)
}

/// Runs `action` with `max_misses` as the budget of [`current_max_misses`].
pub(crate) fn with_max_misses<R>(max_misses: usize, action: impl FnOnce() -> R) -> R {
    struct Restore(Option<usize>);

    impl Drop for Restore {
        fn drop(&mut self) {
            RUN_MAX_MISSES.with(|cell| cell.set(self.0));
        }
    }

    let _restore = Restore(RUN_MAX_MISSES.with(|cell| cell.replace(Some(max_misses))));
    action()
}
/// Default cap on the number of edge cases of an arbitrary.
pub const DEFAULT_MAX_EDGE_CASES: usize = 1000;
/// Generation size used when sampling outside of a property run.
pub const SAMPLE_GEN_SIZE: u32 = 1000;
/// Default presence probability of [`Arbitrary::optional`].
pub const DEFAULT_PRESENCE_PROBABILITY: f64 = 0.95;

pub trait Arbitrary: Send + Sync + 'static {
    type Value: Value;

    /// Random generator for the given size hint.
    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value>;

    /// Random generator whose nested element generators inject their own
    /// edge cases. Only containers and dependent arbitraries differ from
    /// [`Arbitrary::generator`].
    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.generator(gen_size)
    }

    /// Enumeration of all values, if it has at most `max_samples` values.
    fn exhaustive(&self, _max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        None
    }

    fn edge_cases(&self, _max_edge_cases: usize) -> EdgeCases<Self::Value> {
        EdgeCases::none()
    }

    /// Shrinkable used for a value added as an edge case by a configurator.
    fn edge_case_for(&self, value: Self::Value) -> Shrinkable<Self::Value> {
        Shrinkable::unshrinkable(value)
    }

    /// Random generator that produces the edge cases first when
    /// `with_edge_cases` is set.
    fn generator_with_edge_cases(&self, gen_size: u32, with_edge_cases: bool) -> RandomGenerator<Self::Value> {
        let mode = if with_edge_cases {
            EdgeCasesMode::First
        } else {
            EdgeCasesMode::None
        };
        self.configured_generator(gen_size, DEFAULT_MAX_EDGE_CASES, mode)
    }

    /// Random generator injecting at most `max_edge_cases` edge cases as
    /// `mode` prescribes.
    fn configured_generator(
        &self,
        gen_size: u32,
        max_edge_cases: usize,
        mode: EdgeCasesMode,
    ) -> RandomGenerator<Self::Value> {
        let generator = self.generator(gen_size);
        if mode == EdgeCasesMode::None {
            return generator;
        }
        generator.with_edge_cases_mode(gen_size, self.edge_cases(max_edge_cases), mode)
    }

    /// All values, if the arbitrary can enumerate them.
    fn all_values(&self) -> Option<Box<dyn Iterator<Item = Self::Value>>> {
        self.exhaustive(MAXIMUM_SAMPLES_TO_GENERATE)
            .map(|generator| generator.iter())
    }

    fn for_each_value<F>(&self, mut action: F) -> Result<(), GenerationError>
    where
        Self: Sized,
        F: FnMut(Self::Value),
    {
        let values = self.all_values().ok_or_else(|| {
            GenerationError::value_unavailable("arbitrary cannot enumerate all of its values")
        })?;
        values.for_each(&mut action);
        Ok(())
    }

    /// One value, drawn from the random source bound to the current
    /// property run if there is one.
    fn sample(&self) -> Result<Self::Value, GenerationError> {
        self.sample_stream()
            .next()
            .unwrap_or_else(|| Err(GenerationError::value_unavailable("empty sample stream")))
    }

    /// Endless stream of values, see [`Arbitrary::sample`].
    fn sample_stream(&self) -> SampleStream<Self::Value> {
        SampleStream::new(self.generator(SAMPLE_GEN_SIZE))
    }

    fn map<U, F>(self, mapper: F) -> Map<Self, U>
    where
        Self: Sized,
        U: Value,
        F: Fn(Self::Value) -> U + Send + Sync + 'static,
    {
        Map::new(self, Arc::new(mapper))
    }

    /// Like [`Arbitrary::map`] for fallible mappings. Failed mappings are
    /// reported as [`GenerationError::User`] and skipped while shrinking.
    fn try_map<U, E, F>(self, mapper: F) -> TryMap<Self, U>
    where
        Self: Sized,
        U: Value,
        E: StdError + Send + Sync + 'static,
        F: Fn(Self::Value) -> Result<U, E> + Send + Sync + 'static,
    {
        TryMap::new(self, Arc::new(move |value| mapper(value).map_err(GenerationError::user)))
    }

    /// Filter giving up after [`current_max_misses`] consecutive misses.
    fn filter<F>(self, predicate: F) -> Filter<Self>
    where
        Self: Sized,
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        Filter::new(self, std::any::type_name::<F>(), Arc::new(predicate), None)
    }

    fn filter_with_max_misses<F>(self, max_misses: usize, predicate: F) -> Filter<Self>
    where
        Self: Sized,
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static,
    {
        Filter::new(self, std::any::type_name::<F>(), Arc::new(predicate), Some(max_misses))
    }

    /// Dependent arbitrary. Edge cases of the arbitraries `mapper` returns
    /// are only used through
    /// [`Arbitrary::generator_with_embedded_edge_cases`].
    fn flat_map<B, F>(self, mapper: F) -> FlatMap<Self, B>
    where
        Self: Sized,
        B: Arbitrary,
        F: Fn(Self::Value) -> B + Send + Sync + 'static,
    {
        FlatMap::new(self, Arc::new(mapper))
    }

    /// `None` with probability `probability`.
    fn inject_null(self, probability: f64) -> InjectNull<Self>
    where
        Self: Sized,
    {
        InjectNull::new(self, probability)
    }

    /// `Some` with probability `presence`.
    fn optional(self, presence: f64) -> InjectNull<Self>
    where
        Self: Sized,
    {
        self.inject_null(1.0 - presence)
    }

    /// Ignores the size hint of the run and always uses `gen_size`.
    fn fix_gen_size(self, gen_size: u32) -> FixGenSize<Self>
    where
        Self: Sized,
    {
        FixGenSize::new(self, gen_size)
    }

    fn list(self) -> ListArbitrary<Self>
    where
        Self: Sized,
    {
        ListArbitrary::new(self)
    }

    fn set(self) -> SetArbitrary<Self>
    where
        Self: Sized,
        Self::Value: Eq + Hash,
    {
        SetArbitrary::new(self)
    }

    /// Lists exposed as replayable iterators.
    fn iter(self) -> IterArbitrary<Self>
    where
        Self: Sized,
    {
        IterArbitrary::new(self)
    }

    fn array<const N: usize>(self) -> ArrayArbitrary<Self, N>
    where
        Self: Sized,
    {
        ArrayArbitrary::new(self)
    }

    /// Lists grown element by element until `until` holds.
    fn collect<F>(self, until: F) -> Collect<Self>
    where
        Self: Sized,
        F: Fn(&[Self::Value]) -> bool + Send + Sync + 'static,
    {
        Collect::new(self, Arc::new(until))
    }

    fn inject_duplicates(self, probability: f64) -> InjectDuplicates<Self>
    where
        Self: Sized,
    {
        InjectDuplicates::new(self, probability)
    }

    /// Redraws when a mapping fails with an error of type `E`.
    fn ignore_exception<E>(self) -> IgnoreException<Self, E>
    where
        Self: Sized,
        E: StdError + Send + Sync + 'static,
    {
        IgnoreException::new(self)
    }

    fn dont_shrink(self) -> DontShrink<Self>
    where
        Self: Sized,
    {
        DontShrink::new(self)
    }

    /// Adjusts the edge cases with `configurator`.
    fn configure_edge_cases<F>(self, configurator: F) -> ConfigureEdgeCases<Self>
    where
        Self: Sized,
        F: Fn(&mut EdgeCasesConfig<Self::Value>) + Send + Sync + 'static,
    {
        ConfigureEdgeCases::new(self, Arc::new(configurator))
    }

    fn without_edge_cases(self) -> WithoutEdgeCases<Self>
    where
        Self: Sized,
    {
        WithoutEdgeCases::new(self)
    }

    fn tuple1(self) -> Map<ArrayArbitrary<Self, 1>, (Self::Value,)>
    where
        Self: Sized,
    {
        self.array::<1>().map(|[a]| (a,))
    }

    fn tuple2(self) -> Map<ArrayArbitrary<Self, 2>, (Self::Value, Self::Value)>
    where
        Self: Sized,
    {
        self.array::<2>().map(|[a, b]| (a, b))
    }

    fn tuple3(self) -> Map<ArrayArbitrary<Self, 3>, (Self::Value, Self::Value, Self::Value)>
    where
        Self: Sized,
    {
        self.array::<3>().map(|[a, b, c]| (a, b, c))
    }

    #[allow(clippy::type_complexity)]
    fn tuple4(
        self,
    ) -> Map<ArrayArbitrary<Self, 4>, (Self::Value, Self::Value, Self::Value, Self::Value)>
    where
        Self: Sized,
    {
        self.array::<4>().map(|[a, b, c, d]| (a, b, c, d))
    }

    #[allow(clippy::type_complexity)]
    fn tuple5(
        self,
    ) -> Map<ArrayArbitrary<Self, 5>, (Self::Value, Self::Value, Self::Value, Self::Value, Self::Value)>
    where
        Self: Sized,
    {
        self.array::<5>().map(|[a, b, c, d, e]| (a, b, c, d, e))
    }

    fn boxed(self) -> BoxedArbitrary<Self::Value>
    where
        Self: Sized,
    {
        BoxedArbitrary::new(self)
    }
}

/// Type-erased arbitrary.
///
/// Edge cases of the wrapped arbitrary are computed once per cap and reused.
/// Generators are built on every call: they may own per-instance state such
/// as the history of [`Arbitrary::inject_duplicates`], and a property run
/// builds its generator once anyway.
pub struct BoxedArbitrary<T> {
    inner: Arc<dyn Arbitrary<Value = T>>,
    edge_cases: Arc<Mutex<HashMap<usize, EdgeCases<T>>>>,
}

impl<T> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            edge_cases: Arc::clone(&self.edge_cases),
        }
    }
}

impl<T: Value> BoxedArbitrary<T> {
    pub fn new<A>(arbitrary: A) -> Self
    where
        A: Arbitrary<Value = T>,
    {
        Self {
            inner: Arc::new(arbitrary),
            edge_cases: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Value> Arbitrary for BoxedArbitrary<T> {
    type Value = T;

    fn generator(&self, gen_size: u32) -> RandomGenerator<T> {
        self.inner.generator(gen_size)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<T> {
        self.inner.generator_with_embedded_edge_cases(gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let cached = self
            .edge_cases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&max_edge_cases)
            .cloned();
        if let Some(edge_cases) = cached {
            return edge_cases;
        }
        let edge_cases = self.inner.edge_cases(max_edge_cases);
        self.edge_cases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(max_edge_cases, edge_cases.clone());
        edge_cases
    }

    fn edge_case_for(&self, value: T) -> Shrinkable<T> {
        self.inner.edge_case_for(value)
    }
}

/// Endless stream of sampled values.
///
/// Draws from the random source bound to the current property run, or from
/// a source seeded from the operating system outside of runs.
pub struct SampleStream<T> {
    generator: RandomGenerator<T>,
    fallback: Option<StdRng>,
}

impl<T: Value> SampleStream<T> {
    pub fn new(generator: RandomGenerator<T>) -> Self {
        Self {
            generator,
            fallback: None,
        }
    }

    fn draw(&mut self) -> Result<T, GenerationError> {
        let generator = &self.generator;
        if let Some(result) = rng::with_current_rng(|rng| generator.next(rng)) {
            return result.map(|shrinkable| shrinkable.value());
        }
        let fallback = self.fallback.get_or_insert_with(StdRng::from_entropy);
        generator.next(fallback).map(|shrinkable| shrinkable.value())
    }
}

impl<T: Value> Iterator for SampleStream<T> {
    type Item = Result<T, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.draw())
    }
}
