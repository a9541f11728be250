//! Collection arbitraries and their shrinking.
//!
//! Lists shrink in this order: removing runs of elements (largest runs
//! first), shrinking single elements, shrinking pairs of elements together,
//! shrinking one element while growing a later one by the same amount, and
//! finally sorting the elements by distance.

use std::any::Any;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::arbitrary::{Arbitrary, current_max_misses};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::GenerationError;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::RandomGenerator;
use crate::shrinkable::{ShrinkStream, Shrinkable, ShrinkableNode, Value};

/// Maximum size of a collection without an explicit maximum.
pub const DEFAULT_COLLECTION_SIZE: usize = 255;

type SameFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Lists of values from an element arbitrary, see [`Arbitrary::list`].
pub struct ListArbitrary<A: Arbitrary> {
    element: A,
    min_size: usize,
    max_size: Option<usize>,
    same: Option<SameFn<A::Value>>,
}

impl<A: Arbitrary> ListArbitrary<A> {
    pub(crate) fn new(element: A) -> Self {
        Self {
            element,
            min_size: 0,
            max_size: None,
            same: None,
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn of_size(self, size: usize) -> Self {
        self.of_min_size(size).of_max_size(size)
    }

    /// No two elements are equal.
    pub fn unique_elements(mut self) -> Self {
        self.same = Some(Arc::new(|a: &A::Value, b: &A::Value| a == b));
        self
    }

    /// No two elements share the same `feature`.
    pub fn unique_by<K, F>(mut self, feature: F) -> Self
    where
        K: PartialEq,
        F: Fn(&A::Value) -> K + Send + Sync + 'static,
    {
        self.same = Some(Arc::new(move |a: &A::Value, b: &A::Value| feature(a) == feature(b)));
        self
    }

    fn max_size(&self) -> usize {
        self.max_size
            .unwrap_or_else(|| DEFAULT_COLLECTION_SIZE.max(self.min_size.saturating_mul(2)))
    }

    fn lists(&self, elements: RandomGenerator<A::Value>, gen_size: u32) -> RandomGenerator<Vec<A::Value>> {
        let min_size = self.min_size;
        let max_size = self.max_size();
        let same = self.same.clone();
        let max_misses = current_max_misses();
        RandomGenerator::new(move |rng| {
            if min_size > max_size {
                return Err(GenerationError::value_unavailable(format!(
                    "minimum size {min_size} exceeds maximum size {max_size}"
                )));
            }
            let size = choose_size(rng, min_size, max_size, gen_size);
            let mut drawn: Vec<Shrinkable<A::Value>> = Vec::with_capacity(size);
            let mut misses = 0;
            while drawn.len() < size {
                let element = elements.next(rng)?;
                if let Some(same) = &same {
                    let value = element.value();
                    if drawn.iter().any(|e| same(&e.value(), &value)) {
                        misses += 1;
                        if misses >= max_misses {
                            return Err(GenerationError::TooManyUniqueMisses { misses, max_misses });
                        }
                        continue;
                    }
                }
                drawn.push(element);
            }
            Ok(ListShrinkable::shrinkable(drawn, min_size, same.clone()))
        })
    }
}

impl<A: Arbitrary> Arbitrary for ListArbitrary<A> {
    type Value = Vec<A::Value>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.lists(self.element.generator(gen_size), gen_size)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.lists(self.element.generator_with_edge_cases(gen_size, true), gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let elements = self.element.exhaustive(max_samples)?;
        let lists = exhaustive::list(&elements, self.min_size, self.max_size(), max_samples)?;
        Some(match &self.same {
            Some(same) => {
                let same = Arc::clone(same);
                lists.filter(move |values| all_distinct(values, &same))
            }
            None => lists,
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        let (min_size, max_size) = (self.min_size, self.max_size());
        let mut edge_cases = Vec::new();
        if min_size == 0 {
            edge_cases.push(ListShrinkable::shrinkable(Vec::new(), min_size, self.same.clone()));
        }
        if min_size <= 1 && max_size >= 1 {
            for element in self.element.edge_cases(max_edge_cases).into_shrinkables() {
                edge_cases.push(ListShrinkable::shrinkable(vec![element], min_size, self.same.clone()));
            }
        }
        EdgeCases::from_shrinkables(edge_cases).limit(max_edge_cases)
    }
}

fn choose_size(rng: &mut dyn RngCore, min_size: usize, max_size: usize, gen_size: u32) -> usize {
    // Small sizes most of the time, the full range occasionally.
    let cutoff = ((gen_size as f64).sqrt() as usize).max(10);
    let soft_max = max_size.min(min_size.saturating_add(cutoff));
    if soft_max < max_size && rng.gen_bool(0.1) {
        rng.gen_range(min_size..=max_size)
    } else {
        rng.gen_range(min_size..=soft_max)
    }
}

fn all_distinct<T>(values: &[T], same: &SameFn<T>) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(i, a)| values[i + 1..].iter().all(|b| !same(a, b)))
}

struct ListShrinkable<T> {
    elements: Arc<Vec<Shrinkable<T>>>,
    min_size: usize,
    same: Option<SameFn<T>>,
}

impl<T: Value> ListShrinkable<T> {
    fn shrinkable(elements: Vec<Shrinkable<T>>, min_size: usize, same: Option<SameFn<T>>) -> Shrinkable<Vec<T>> {
        Shrinkable::new(ListShrinkable {
            elements: Arc::new(elements),
            min_size,
            same,
        })
    }

    fn removals(&self) -> ShrinkStream<Vec<T>> {
        let len = self.elements.len();
        if len <= self.min_size {
            return Box::new(std::iter::empty());
        }
        let elements = Arc::clone(&self.elements);
        let (min_size, same) = (self.min_size, self.same.clone());
        let run_lengths = std::iter::successors(Some(len - min_size), |run| (*run > 1).then(|| run / 2));
        Box::new(
            run_lengths
                .flat_map(move |run| (0..=len - run).step_by(run).map(move |start| (start, run)))
                .map(move |(start, run)| {
                    let remaining = elements
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i < start || *i >= start + run)
                        .map(|(_, e)| e.clone())
                        .collect();
                    ListShrinkable::shrinkable(remaining, min_size, same.clone())
                }),
        )
    }

    fn element_shrinks(&self) -> ShrinkStream<Vec<T>> {
        let elements = Arc::clone(&self.elements);
        let (min_size, same) = (self.min_size, self.same.clone());
        Box::new((0..self.elements.len()).flat_map(move |i| {
            let elements = Arc::clone(&elements);
            let same = same.clone();
            let shrinks = elements.get(i).map(|e| e.shrink()).into_iter().flatten();
            shrinks.map(move |candidate| {
                let mut replaced = elements.as_ref().clone();
                replaced[i] = candidate;
                ListShrinkable::shrinkable(replaced, min_size, same.clone())
            })
        }))
    }

    fn pair_shrinks(&self) -> ShrinkStream<Vec<T>> {
        let elements = Arc::clone(&self.elements);
        let (min_size, same) = (self.min_size, self.same.clone());
        Box::new(pairs(self.elements.len()).flat_map(move |(i, j)| {
            let elements = Arc::clone(&elements);
            let same = same.clone();
            let (first, second) = (elements[i].shrink(), elements[j].shrink());
            first.zip(second).map(move |(a, b)| {
                let mut replaced = elements.as_ref().clone();
                replaced[i] = a;
                replaced[j] = b;
                ListShrinkable::shrinkable(replaced, min_size, same.clone())
            })
        }))
    }

    fn shrink_and_grow(&self) -> ShrinkStream<Vec<T>> {
        let elements = Arc::clone(&self.elements);
        let (min_size, same) = (self.min_size, self.same.clone());
        Box::new(pairs(self.elements.len()).flat_map(move |(i, j)| {
            let elements = Arc::clone(&elements);
            let same = same.clone();
            let before = elements[i].value();
            elements[i].shrink().filter_map(move |shrunk| {
                let after = shrunk.value();
                let grown = elements[j].grow(&before as &dyn Any, &after as &dyn Any)?;
                let mut replaced = elements.as_ref().clone();
                replaced[i] = shrunk;
                replaced[j] = grown;
                Some(ListShrinkable::shrinkable(replaced, min_size, same.clone()))
            })
        }))
    }

    fn sorted(&self) -> ShrinkStream<Vec<T>> {
        let is_sorted = self
            .elements
            .windows(2)
            .all(|pair| pair[0].distance() <= pair[1].distance());
        if is_sorted {
            return Box::new(std::iter::empty());
        }
        let mut sorted = self.elements.as_ref().clone();
        sorted.sort_by_key(|e| e.distance());
        Box::new(std::iter::once(ListShrinkable::shrinkable(
            sorted,
            self.min_size,
            self.same.clone(),
        )))
    }
}

/// Index pairs `(i, j)` with `i < j`.
fn pairs(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).flat_map(move |i| (i + 1..len).map(move |j| (i, j)))
}

impl<T: Value> ShrinkableNode<Vec<T>> for ListShrinkable<T> {
    fn value(&self) -> Vec<T> {
        self.elements.iter().map(Shrinkable::value).collect()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.elements)
    }

    fn shrink(&self) -> ShrinkStream<Vec<T>> {
        let candidates = self
            .removals()
            .chain(self.element_shrinks())
            .chain(self.pair_shrinks())
            .chain(self.shrink_and_grow())
            .chain(self.sorted());
        match self.same.clone() {
            Some(same) => Box::new(candidates.filter(move |candidate| all_distinct(&candidate.value(), &same))),
            None => Box::new(candidates),
        }
    }
}

/// Result of [`RandomGenerator::collect`]. Shrinks only to lists that still
/// satisfy the condition and have no shorter prefix satisfying it.
pub(crate) struct CollectShrinkable<T> {
    elements: Vec<Shrinkable<T>>,
    until: Arc<dyn Fn(&[T]) -> bool + Send + Sync>,
}

impl<T: Value> CollectShrinkable<T> {
    pub(crate) fn new(elements: Vec<Shrinkable<T>>, until: Arc<dyn Fn(&[T]) -> bool + Send + Sync>) -> Self {
        Self { elements, until }
    }

    fn is_collected(until: &(dyn Fn(&[T]) -> bool + Send + Sync), elements: &[Shrinkable<T>]) -> bool {
        let values: Vec<T> = elements.iter().map(Shrinkable::value).collect();
        until(&values) && (0..values.len()).all(|prefix| !until(&values[..prefix]))
    }
}

impl<T: Value> ShrinkableNode<Vec<T>> for CollectShrinkable<T> {
    fn value(&self) -> Vec<T> {
        self.elements.iter().map(Shrinkable::value).collect()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.elements)
    }

    fn shrink(&self) -> ShrinkStream<Vec<T>> {
        let elements = self.elements.clone();
        let removed = (0..elements.len()).map(move |i| {
            let mut remaining = elements.clone();
            remaining.remove(i);
            remaining
        });

        let elements = self.elements.clone();
        let shrunk = (0..elements.len()).flat_map(move |i| {
            let elements = elements.clone();
            let shrinks = elements[i].shrink();
            shrinks.map(move |candidate| {
                let mut replaced = elements.clone();
                replaced[i] = candidate;
                replaced
            })
        });

        let until = Arc::clone(&self.until);
        Box::new(removed.chain(shrunk).filter_map(move |elements| {
            CollectShrinkable::is_collected(until.as_ref(), &elements).then(|| {
                Shrinkable::new(CollectShrinkable::new(elements, Arc::clone(&until)))
            })
        }))
    }
}

/// Sets of values from an element arbitrary, see [`Arbitrary::set`].
pub struct SetArbitrary<A: Arbitrary> {
    list: ListArbitrary<A>,
}

impl<A> SetArbitrary<A>
where
    A: Arbitrary,
    A::Value: Eq + Hash,
{
    pub(crate) fn new(element: A) -> Self {
        Self {
            list: ListArbitrary::new(element).unique_elements(),
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.list = self.list.of_min_size(min_size);
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.list = self.list.of_max_size(max_size);
        self
    }

    pub fn of_size(mut self, size: usize) -> Self {
        self.list = self.list.of_size(size);
        self
    }
}

fn into_set<T: Eq + Hash>(values: Vec<T>) -> HashSet<T> {
    values.into_iter().collect()
}

impl<A> Arbitrary for SetArbitrary<A>
where
    A: Arbitrary,
    A::Value: Eq + Hash,
{
    type Value = HashSet<A::Value>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list.generator(gen_size).map(into_set)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list
            .generator_with_embedded_edge_cases(gen_size)
            .map(into_set)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        let elements = self.list.element.exhaustive(max_samples)?;
        let subsets = exhaustive::subsets(&elements, self.list.min_size, self.list.max_size(), max_samples)?;
        Some(subsets.map(into_set))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        self.list.edge_cases(max_edge_cases).map(into_set)
    }
}

/// Replayable iterator over generated elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIter<T> {
    items: Vec<T>,
    position: usize,
}

impl<T: Clone> ValueIter<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, position: 0 }
    }

    /// All elements, including those already consumed.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Iterator for ValueIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.get(self.position).cloned()?;
        self.position += 1;
        Some(item)
    }
}

/// Iterators of values from an element arbitrary, see [`Arbitrary::iter`].
pub struct IterArbitrary<A: Arbitrary> {
    list: ListArbitrary<A>,
}

impl<A: Arbitrary> IterArbitrary<A> {
    pub(crate) fn new(element: A) -> Self {
        Self {
            list: ListArbitrary::new(element),
        }
    }

    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.list = self.list.of_min_size(min_size);
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.list = self.list.of_max_size(max_size);
        self
    }

    pub fn unique_elements(mut self) -> Self {
        self.list = self.list.unique_elements();
        self
    }
}

impl<A: Arbitrary> Arbitrary for IterArbitrary<A> {
    type Value = ValueIter<A::Value>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list.generator(gen_size).map(ValueIter::new)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list
            .generator_with_embedded_edge_cases(gen_size)
            .map(ValueIter::new)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        self.list
            .exhaustive(max_samples)
            .map(|lists| lists.map(ValueIter::new))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        self.list.edge_cases(max_edge_cases).map(ValueIter::new)
    }
}

/// Fixed-size arrays, see [`Arbitrary::array`].
pub struct ArrayArbitrary<A: Arbitrary, const N: usize> {
    list: ListArbitrary<A>,
}

impl<A: Arbitrary, const N: usize> ArrayArbitrary<A, N> {
    pub(crate) fn new(element: A) -> Self {
        Self {
            list: ListArbitrary::new(element).of_size(N),
        }
    }

    pub fn unique_elements(mut self) -> Self {
        self.list = self.list.unique_elements();
        self
    }
}

fn into_array<T: Clone, const N: usize>(values: Vec<T>) -> [T; N] {
    std::array::from_fn(|i| values[i].clone())
}

impl<A: Arbitrary, const N: usize> Arbitrary for ArrayArbitrary<A, N> {
    type Value = [A::Value; N];

    fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list.generator(gen_size).map(into_array)
    }

    fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
        self.list
            .generator_with_embedded_edge_cases(gen_size)
            .map(into_array)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
        self.list
            .exhaustive(max_samples)
            .map(|lists| lists.map(into_array))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
        self.list.edge_cases(max_edge_cases).map(into_array)
    }
}
