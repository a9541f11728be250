//! Concrete arbitraries for primitive values and for choosing among values.

use std::any::Any;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::Arc;

use num_traits::PrimInt;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::collections::ListArbitrary;
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::GenerationError;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::RandomGenerator;
use crate::shrinkable::{ShrinkStream, Shrinkable, ShrinkableNode, Value};

/// Primitive integers that fit into an `i128`.
pub trait Integral: PrimInt + Hash + Value {
    fn to_wide(self) -> i128;

    /// Narrows a value known to be within `Self`'s bounds.
    fn from_wide(value: i128) -> Self;
}

macro_rules! impl_integral {
    ($($t:ty),* $(,)?) => {
        $(
            impl Integral for $t {
                fn to_wide(self) -> i128 {
                    self as i128
                }

                fn from_wide(value: i128) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_integral!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

/// Unsigned distance between two wide integers.
fn gap(a: i128, b: i128) -> u128 {
    if a >= b {
        (a as u128).wrapping_sub(b as u128)
    } else {
        (b as u128).wrapping_sub(a as u128)
    }
}

/// Moves `value` by `step` in the direction of `target`.
fn toward(value: i128, target: i128, step: u128) -> i128 {
    if value > target {
        (value as u128).wrapping_sub(step) as i128
    } else {
        (value as u128).wrapping_add(step) as i128
    }
}

/// An integer within `[min, max]` shrinking towards `target`.
///
/// Candidates are the target itself, then values approaching the current
/// value by halving the remaining gap, ending with the direct neighbour.
pub struct IntegralShrinkable<T> {
    value: i128,
    target: i128,
    min: i128,
    max: i128,
    marker: PhantomData<fn() -> T>,
}

impl<T: Integral> IntegralShrinkable<T> {
    pub fn within(value: T, target: T, min: T, max: T) -> Shrinkable<T> {
        Self::wide(value.to_wide(), target.to_wide(), min.to_wide(), max.to_wide())
    }

    fn wide(value: i128, target: i128, min: i128, max: i128) -> Shrinkable<T> {
        Shrinkable::new(IntegralShrinkable {
            value,
            target,
            min,
            max,
            marker: PhantomData,
        })
    }
}

impl<T: Integral> ShrinkableNode<T> for IntegralShrinkable<T> {
    fn value(&self) -> T {
        T::from_wide(self.value)
    }

    fn distance(&self) -> ShrinkingDistance {
        let gap = gap(self.value, self.target);
        ShrinkingDistance::of(u64::try_from(gap).unwrap_or(u64::MAX))
    }

    fn shrink(&self) -> ShrinkStream<T> {
        let (value, target, min, max) = (self.value, self.target, self.min, self.max);
        let gap = gap(value, target);
        if gap == 0 {
            return Box::new(std::iter::empty());
        }
        let steps = std::iter::successors(Some(gap), |step| (*step > 1).then(|| step / 2));
        Box::new(steps.map(move |step| {
            IntegralShrinkable::wide(toward(value, target, step), target, min, max)
        }))
    }

    fn grow(&self, before: &dyn Any, after: &dyn Any) -> Option<Shrinkable<T>> {
        let before = before.downcast_ref::<T>()?.to_wide();
        let after = after.downcast_ref::<T>()?.to_wide();
        let grown = self.value.checked_add(before.checked_sub(after)?)?;
        if grown == self.value || grown < self.min || grown > self.max {
            return None;
        }
        Some(IntegralShrinkable::wide(grown, self.target, self.min, self.max))
    }
}

/// Integers of type `T`, see [`integers`].
#[derive(Debug, Clone)]
pub struct IntegralArbitrary<T> {
    min: T,
    max: T,
    target: Option<T>,
}

/// All values of an integer type, shrinking towards zero.
pub fn integers<T: Integral>() -> IntegralArbitrary<T> {
    IntegralArbitrary {
        min: T::min_value(),
        max: T::max_value(),
        target: None,
    }
}

impl<T: Integral> IntegralArbitrary<T> {
    pub fn between(mut self, min: T, max: T) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn greater_or_equal(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    pub fn less_or_equal(mut self, max: T) -> Self {
        self.max = max;
        self
    }

    /// Shrinking target; clamped into the range. Defaults to the value
    /// closest to zero.
    pub fn shrink_towards(mut self, target: T) -> Self {
        self.target = Some(target);
        self
    }

    fn bounds(&self) -> (i128, i128, i128) {
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        let target = match self.target {
            Some(target) => target.to_wide().clamp(min, max.max(min)),
            None => 0i128.clamp(min, max.max(min)),
        };
        (min, max, target)
    }
}

impl<T: Integral> Arbitrary for IntegralArbitrary<T> {
    type Value = T;

    fn generator(&self, gen_size: u32) -> RandomGenerator<T> {
        let (min, max, target) = self.bounds();
        RandomGenerator::new(move |rng| {
            if min > max {
                return Err(GenerationError::value_unavailable(format!(
                    "empty integer range [{min}, {max}]"
                )));
            }
            // Half of the draws stay within gen_size of the target.
            let value = if rng.gen_bool(0.5) {
                let span = i128::from(gen_size);
                let low = target.saturating_sub(span).max(min);
                let high = target.saturating_add(span).min(max);
                rng.gen_range(low..=high)
            } else {
                rng.gen_range(min..=max)
            };
            Ok(IntegralShrinkable::wide(value, target, min, max))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let (min, max, _) = self.bounds();
        if min > max {
            return None;
        }
        let count = u64::try_from(gap(max, min)).ok()?.checked_add(1)?;
        ExhaustiveGenerator::new(count, max_samples, move || Box::new((min..=max).map(T::from_wide)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let (min, max, target) = self.bounds();
        if min > max {
            return EdgeCases::none();
        }
        let candidates = [
            Some(target),
            target.checked_add(1),
            target.checked_sub(1),
            Some(min),
            min.checked_add(1),
            max.checked_sub(1),
            Some(max),
        ];
        EdgeCases::from_shrinkables(
            candidates
                .into_iter()
                .flatten()
                .filter(|value| (min..=max).contains(value))
                .map(|value| IntegralShrinkable::wide(value, target, min, max)),
        )
        .limit(max_edge_cases)
    }

    fn edge_case_for(&self, value: T) -> Shrinkable<T> {
        let (min, max, target) = self.bounds();
        let wide = value.to_wide();
        if (min..=max).contains(&wide) {
            IntegralShrinkable::wide(wide, target, min, max)
        } else {
            Shrinkable::unshrinkable(value)
        }
    }
}

fn index_shrinkable(index: usize, len: usize) -> Shrinkable<usize> {
    IntegralShrinkable::within(index, 0, 0, len.saturating_sub(1))
}

/// `false` and `true`, shrinking to `false`.
pub fn booleans() -> Choose<bool> {
    of(vec![false, true])
}

/// Always `value`.
pub fn just<T: Value>(value: T) -> Just<T> {
    Just { value }
}

pub struct Just<T> {
    value: T,
}

impl<T: Value> Arbitrary for Just<T> {
    type Value = T;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<T> {
        RandomGenerator::constant(self.value.clone())
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::from_values(vec![self.value.clone()], max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_values([self.value.clone()]).limit(max_edge_cases)
    }
}

/// One of `values`, shrinking towards earlier values.
pub fn of<T: Value>(values: impl IntoIterator<Item = T>) -> Choose<T> {
    Choose {
        values: Arc::new(values.into_iter().collect()),
    }
}

pub struct Choose<T> {
    values: Arc<Vec<T>>,
}

impl<T: Value> Choose<T> {
    fn choice(&self, index: usize) -> Shrinkable<T> {
        let values = Arc::clone(&self.values);
        index_shrinkable(index, values.len()).map(move |i| values[i].clone())
    }
}

impl<T: Value> Arbitrary for Choose<T> {
    type Value = T;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<T> {
        let values = Arc::clone(&self.values);
        RandomGenerator::new(move |rng| {
            if values.is_empty() {
                return Err(GenerationError::value_unavailable("no values to choose from"));
            }
            let index = rng.gen_range(0..values.len());
            let chosen = Arc::clone(&values);
            Ok(index_shrinkable(index, values.len()).map(move |i| chosen[i].clone()))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::from_values(self.values.as_ref().clone(), max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        if self.values.is_empty() {
            return EdgeCases::none();
        }
        EdgeCases::from_shrinkables([self.choice(0), self.choice(self.values.len() - 1)])
            .limit(max_edge_cases)
    }

    fn edge_case_for(&self, value: T) -> Shrinkable<T> {
        match self.values.iter().position(|v| *v == value) {
            Some(index) => self.choice(index),
            None => Shrinkable::unshrinkable(value),
        }
    }
}

/// Values drawn with probability proportional to their weight.
pub fn frequency<T: Value>(weighted: impl IntoIterator<Item = (u32, T)>) -> Frequency<T> {
    let weighted: Vec<(u32, T)> = weighted.into_iter().filter(|(weight, _)| *weight > 0).collect();
    Frequency {
        weighted: Arc::new(weighted),
    }
}

pub struct Frequency<T> {
    weighted: Arc<Vec<(u32, T)>>,
}

fn pick_weighted(rng: &mut dyn RngCore, weights: &[u32]) -> Option<usize> {
    let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    if total == 0 {
        return None;
    }
    let mut remaining = rng.gen_range(0..total);
    for (index, weight) in weights.iter().enumerate() {
        let weight = u64::from(*weight);
        if remaining < weight {
            return Some(index);
        }
        remaining -= weight;
    }
    None
}

impl<T: Value> Frequency<T> {
    fn choice(&self, index: usize) -> Shrinkable<T> {
        let weighted = Arc::clone(&self.weighted);
        index_shrinkable(index, weighted.len()).map(move |i| weighted[i].1.clone())
    }
}

impl<T: Value> Arbitrary for Frequency<T> {
    type Value = T;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<T> {
        let weighted = Arc::clone(&self.weighted);
        let weights: Vec<u32> = weighted.iter().map(|(weight, _)| *weight).collect();
        RandomGenerator::new(move |rng| {
            let index = pick_weighted(rng, &weights)
                .ok_or_else(|| GenerationError::value_unavailable("frequencies sum up to zero"))?;
            let chosen = Arc::clone(&weighted);
            Ok(index_shrinkable(index, weighted.len()).map(move |i| chosen[i].1.clone()))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let values = self.weighted.iter().map(|(_, value)| value.clone()).collect();
        ExhaustiveGenerator::from_values(values, max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        if self.weighted.is_empty() {
            return EdgeCases::none();
        }
        EdgeCases::from_shrinkables([self.choice(0), self.choice(self.weighted.len() - 1)])
            .limit(max_edge_cases)
    }
}

/// Draws from one of `arbitraries`, chosen uniformly. Shrinks towards
/// earlier arbitraries.
pub fn one_of<T: Value>(arbitraries: impl IntoIterator<Item = BoxedArbitrary<T>>) -> OneOf<T> {
    frequency_of(arbitraries.into_iter().map(|arbitrary| (1, arbitrary)))
}

/// Draws from one of `arbitraries`, chosen with probability proportional to
/// its weight.
pub fn frequency_of<T: Value>(weighted: impl IntoIterator<Item = (u32, BoxedArbitrary<T>)>) -> OneOf<T> {
    let (weights, arbitraries): (Vec<u32>, Vec<BoxedArbitrary<T>>) = weighted
        .into_iter()
        .filter(|(weight, _)| *weight > 0)
        .unzip();
    OneOf {
        weights,
        arbitraries: Arc::new(arbitraries),
    }
}

pub struct OneOf<T> {
    weights: Vec<u32>,
    arbitraries: Arc<Vec<BoxedArbitrary<T>>>,
}

impl<T: Value> Arbitrary for OneOf<T> {
    type Value = T;

    fn generator(&self, gen_size: u32) -> RandomGenerator<T> {
        let weights = self.weights.clone();
        let arbitraries = Arc::clone(&self.arbitraries);
        RandomGenerator::new(move |rng| {
            let index = pick_weighted(rng, &weights)
                .ok_or_else(|| GenerationError::value_unavailable("no arbitraries to choose from"))?;
            let seed = rng.next_u64();
            let choices = Arc::clone(&arbitraries);
            index_shrinkable(index, arbitraries.len()).flat_map(move |i| choices[i].clone(), gen_size, seed)
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let generators = self
            .arbitraries
            .iter()
            .map(|arbitrary| arbitrary.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        exhaustive::chain(generators, max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::concat(
            self.arbitraries
                .iter()
                .map(|arbitrary| arbitrary.edge_cases(max_edge_cases)),
            max_edge_cases,
        )
    }
}

/// A fresh value from `supplier` on every draw. Never shrinks.
pub fn create<T, F>(supplier: F) -> Create<T>
where
    T: Value,
    F: Fn() -> T + Send + Sync + 'static,
{
    Create {
        supplier: Arc::new(supplier),
    }
}

pub struct Create<T> {
    supplier: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T: Value> Create<T> {
    fn supplied(&self) -> Shrinkable<T> {
        let supplier = Arc::clone(&self.supplier);
        Shrinkable::supplied(move || supplier())
    }
}

impl<T: Value> Arbitrary for Create<T> {
    type Value = T;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<T> {
        let supplier = Arc::clone(&self.supplier);
        RandomGenerator::new(move |_| {
            let supplier = Arc::clone(&supplier);
            Ok(Shrinkable::supplied(move || supplier()))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let supplier = Arc::clone(&self.supplier);
        ExhaustiveGenerator::new(1, max_samples, move || Box::new(std::iter::once(supplier())))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_shrinkables([self.supplied()]).limit(max_edge_cases)
    }
}

/// Defers building the arbitrary until a value is drawn. Needed for
/// recursive definitions.
pub fn lazy<A, F>(supplier: F) -> Lazy<A::Value>
where
    A: Arbitrary,
    F: Fn() -> A + Send + Sync + 'static,
{
    Lazy {
        supplier: Arc::new(move || supplier().boxed()),
    }
}

pub struct Lazy<T> {
    supplier: Arc<dyn Fn() -> BoxedArbitrary<T> + Send + Sync>,
}

impl<T: Value> Arbitrary for Lazy<T> {
    type Value = T;

    fn generator(&self, gen_size: u32) -> RandomGenerator<T> {
        let supplier = Arc::clone(&self.supplier);
        RandomGenerator::new(move |rng| supplier().generator(gen_size).next(rng))
    }
}

/// Random orderings of `values`, shrinking towards the given order.
pub fn shuffle<T: Value>(values: impl IntoIterator<Item = T>) -> Shuffle<T> {
    Shuffle {
        values: Arc::new(values.into_iter().collect()),
    }
}

pub struct Shuffle<T> {
    values: Arc<Vec<T>>,
}

impl<T: Value> Arbitrary for Shuffle<T> {
    type Value = Vec<T>;

    fn generator(&self, _gen_size: u32) -> RandomGenerator<Vec<T>> {
        let values = Arc::clone(&self.values);
        RandomGenerator::new(move |rng| {
            let mut order: Vec<usize> = (0..values.len()).collect();
            order.shuffle(rng);
            Ok(Shrinkable::new(Permutation {
                values: Arc::clone(&values),
                order: Arc::new(order),
            }))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        exhaustive::permutations(self.values.as_ref().clone(), max_samples)
    }
}

struct Permutation<T> {
    values: Arc<Vec<T>>,
    order: Arc<Vec<usize>>,
}

impl<T: Value> ShrinkableNode<Vec<T>> for Permutation<T> {
    fn value(&self) -> Vec<T> {
        self.order.iter().map(|i| self.values[*i].clone()).collect()
    }

    /// Number of inversions.
    fn distance(&self) -> ShrinkingDistance {
        let inversions = self
            .order
            .iter()
            .enumerate()
            .map(|(i, a)| self.order[i + 1..].iter().filter(|b| *b < a).count() as u64)
            .sum();
        ShrinkingDistance::of(inversions)
    }

    fn shrink(&self) -> ShrinkStream<Vec<T>> {
        let values = Arc::clone(&self.values);
        let order = Arc::clone(&self.order);
        let positions = 0..self.order.len().saturating_sub(1);
        Box::new(positions.filter_map(move |k| {
            if order[k] < order[k + 1] {
                return None;
            }
            let mut swapped = order.as_ref().clone();
            swapped.swap(k, k + 1);
            Some(Shrinkable::new(Permutation {
                values: Arc::clone(&values),
                order: Arc::new(swapped),
            }))
        }))
    }
}

/// Characters from a set of ranges, see [`chars`].
#[derive(Debug, Clone, Default)]
pub struct CharArbitrary {
    ranges: Vec<RangeInclusive<char>>,
}

/// Any unicode scalar value unless restricted with the builder methods,
/// which add to the set of allowed characters.
pub fn chars() -> CharArbitrary {
    CharArbitrary::default()
}

impl CharArbitrary {
    pub fn range(mut self, min: char, max: char) -> Self {
        self.ranges.push(min..=max);
        self
    }

    pub fn with(mut self, allowed: &[char]) -> Self {
        self.ranges.extend(allowed.iter().map(|c| *c..=*c));
        self
    }

    pub fn ascii(self) -> Self {
        self.range('\0', '\x7f')
    }

    pub fn numeric(self) -> Self {
        self.range('0', '9')
    }

    pub fn alpha(self) -> Self {
        self.range('a', 'z').range('A', 'Z')
    }

    /// Code point blocks `(start, len)`; surrogates are split out.
    fn blocks(&self) -> Vec<(u32, u32)> {
        let ranges = if self.ranges.is_empty() {
            vec!['\0'..=char::MAX]
        } else {
            self.ranges.clone()
        };
        let mut blocks = Vec::new();
        for range in ranges {
            let (start, end) = (u32::from(*range.start()), u32::from(*range.end()));
            if start > end {
                continue;
            }
            if start < 0xD800 && end > 0xDFFF {
                blocks.push((start, 0xD800 - start));
                blocks.push((0xE000, end - 0xE000 + 1));
            } else {
                blocks.push((start, end - start + 1));
            }
        }
        blocks
    }

    fn count(blocks: &[(u32, u32)]) -> usize {
        blocks.iter().map(|(_, len)| *len as usize).sum()
    }

    fn char_at(blocks: &[(u32, u32)], mut index: usize) -> char {
        for (start, len) in blocks {
            let len = *len as usize;
            if index < len {
                return char::from_u32(*start + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
            index -= len;
        }
        char::REPLACEMENT_CHARACTER
    }

    fn indexed(&self) -> IntegralArbitrary<usize> {
        let count = Self::count(&self.blocks());
        integers::<usize>().between(0, count.saturating_sub(1))
    }

    fn to_char(&self) -> impl Fn(usize) -> char + Send + Sync + 'static {
        let blocks = self.blocks();
        move |index| Self::char_at(&blocks, index)
    }
}

impl Arbitrary for CharArbitrary {
    type Value = char;

    fn generator(&self, gen_size: u32) -> RandomGenerator<char> {
        if Self::count(&self.blocks()) == 0 {
            return RandomGenerator::fail(GenerationError::value_unavailable("no characters in the allowed ranges"));
        }
        self.indexed().generator(gen_size).map(self.to_char())
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<char>> {
        if Self::count(&self.blocks()) == 0 {
            return None;
        }
        self.indexed()
            .exhaustive(max_samples)
            .map(|indices| indices.map(self.to_char()))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<char> {
        let count = Self::count(&self.blocks());
        if count == 0 {
            return EdgeCases::none();
        }
        let indices = self.indexed();
        EdgeCases::from_shrinkables([indices.edge_case_for(0), indices.edge_case_for(count - 1)])
            .map(self.to_char())
            .limit(max_edge_cases)
    }
}

/// Strings of characters from a [`CharArbitrary`], see [`strings`].
#[derive(Debug, Clone)]
pub struct StringArbitrary {
    chars: CharArbitrary,
    min_length: usize,
    max_length: Option<usize>,
}

pub fn strings() -> StringArbitrary {
    StringArbitrary {
        chars: chars(),
        min_length: 0,
        max_length: None,
    }
}

impl StringArbitrary {
    pub fn of_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn of_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn of_length(self, length: usize) -> Self {
        self.of_min_length(length).of_max_length(length)
    }

    pub fn with_chars(mut self, allowed: &[char]) -> Self {
        self.chars = self.chars.with(allowed);
        self
    }

    pub fn with_char_range(mut self, min: char, max: char) -> Self {
        self.chars = self.chars.range(min, max);
        self
    }

    pub fn ascii(mut self) -> Self {
        self.chars = self.chars.ascii();
        self
    }

    pub fn alpha(mut self) -> Self {
        self.chars = self.chars.alpha();
        self
    }

    pub fn numeric(mut self) -> Self {
        self.chars = self.chars.numeric();
        self
    }

    fn lists(&self) -> ListArbitrary<CharArbitrary> {
        let lists = self.chars.clone().list().of_min_size(self.min_length);
        match self.max_length {
            Some(max_length) => lists.of_max_size(max_length),
            None => lists,
        }
    }
}

fn into_string(chars: Vec<char>) -> String {
    chars.into_iter().collect()
}

impl Arbitrary for StringArbitrary {
    type Value = String;

    fn generator(&self, gen_size: u32) -> RandomGenerator<String> {
        self.lists().generator(gen_size).map(into_string)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<String> {
        self.lists()
            .generator_with_embedded_edge_cases(gen_size)
            .map(into_string)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<String>> {
        self.lists()
            .exhaustive(max_samples)
            .map(|lists| lists.map(into_string))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<String> {
        self.lists().edge_cases(max_edge_cases).map(into_string)
    }
}
