//! Combining several arbitraries into one.
//!
//! `combine2(a, b)` and friends draw one value from each arbitrary and hand
//! them out as a tuple. The combined value shrinks one component at a time,
//! in order, keeping the other components fixed.

use std::sync::Arc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::{self, ExhaustiveGenerator};
use crate::generator::RandomGenerator;
use crate::shrinkable::{ShrinkStream, Shrinkable, ShrinkableNode, Value};
use crate::transform::{Filter, FlatMap, Map};

/// Builder returned by the `combine` functions.
pub struct Combinator<S> {
    source: S,
}

impl<S: Arbitrary> Combinator<S> {
    fn new(source: S) -> Self {
        Self { source }
    }

    /// Rejects combinations failing `predicate`. Giving up is reported as
    /// an unsatisfiable combination.
    pub fn filter<F>(self, predicate: F) -> Combinator<Filter<S>>
    where
        F: Fn(&S::Value) -> bool + Send + Sync + 'static,
    {
        Combinator::new(Filter::combinations(self.source, Arc::new(predicate), None))
    }

    pub fn filter_with_max_misses<F>(self, max_misses: usize, predicate: F) -> Combinator<Filter<S>>
    where
        F: Fn(&S::Value) -> bool + Send + Sync + 'static,
    {
        Combinator::new(Filter::combinations(self.source, Arc::new(predicate), Some(max_misses)))
    }

    /// Combines the drawn values with `combinator`.
    pub fn map<U, F>(self, combinator: F) -> Map<S, U>
    where
        U: Value,
        F: Fn(S::Value) -> U + Send + Sync + 'static,
    {
        self.source.map(combinator)
    }

    /// Uses the drawn values to choose another arbitrary.
    pub fn flat_map<B, F>(self, combinator: F) -> FlatMap<S, B>
    where
        B: Arbitrary,
        F: Fn(S::Value) -> B + Send + Sync + 'static,
    {
        self.source.flat_map(combinator)
    }

    /// The combined values as they are.
    pub fn as_tuple(self) -> S {
        self.source
    }
}

/// Pairs each edge case of one component with the first edge case of every
/// other component. Empty if any component has no edge cases.
fn pairwise_with_default<T: Value>(
    components: Vec<Vec<Shrinkable<T>>>,
    max_edge_cases: usize,
    assemble: impl Fn(Vec<Shrinkable<T>>) -> Shrinkable<Vec<T>>,
) -> EdgeCases<Vec<T>> {
    let Some(defaults) = components
        .iter()
        .map(|edge_cases| edge_cases.first().cloned())
        .collect::<Option<Vec<_>>>()
    else {
        return EdgeCases::none();
    };
    let mut combined = vec![assemble(defaults.clone())];
    for (axis, edge_cases) in components.iter().enumerate() {
        for edge_case in edge_cases.iter().skip(1) {
            let mut parts = defaults.clone();
            parts[axis] = edge_case.clone();
            combined.push(assemble(parts));
        }
    }
    EdgeCases::from_shrinkables(combined).limit(max_edge_cases)
}

macro_rules! combination {
    (
        $(#[$meta:meta])*
        $combine:ident, $arbitrary:ident, $shrinkable:ident, $product:ident;
        $($A:ident $a:ident $idx:tt),+
    ) => {
        pub struct $arbitrary<$($A),+> {
            sources: ($($A,)+),
        }

        struct $shrinkable<$($A),+> {
            parts: ($(Shrinkable<$A>,)+),
        }

        impl<$($A: Value),+> ShrinkableNode<($($A,)+)> for $shrinkable<$($A),+> {
            fn value(&self) -> ($($A,)+) {
                ($(self.parts.$idx.value(),)+)
            }

            fn distance(&self) -> ShrinkingDistance {
                let distances = [$(self.parts.$idx.distance()),+];
                ShrinkingDistance::combine(distances.iter())
            }

            fn shrink(&self) -> ShrinkStream<($($A,)+)> {
                let mut candidates: ShrinkStream<($($A,)+)> = Box::new(std::iter::empty());
                $(
                    let parts = self.parts.clone();
                    let axis = self.parts.$idx.shrink().map(move |candidate| {
                        let mut parts = parts.clone();
                        parts.$idx = candidate;
                        Shrinkable::new($shrinkable { parts })
                    });
                    candidates = Box::new(candidates.chain(axis));
                )+
                candidates
            }
        }

        impl<$($A: Arbitrary),+> $arbitrary<$($A),+> {
            fn combined(generators: ($(RandomGenerator<$A::Value>,)+)) -> RandomGenerator<($($A::Value,)+)> {
                RandomGenerator::new(move |rng| {
                    let parts = ($(generators.$idx.next(rng)?,)+);
                    Ok(Shrinkable::new($shrinkable { parts }))
                })
            }
        }

        impl<$($A: Arbitrary),+> Arbitrary for $arbitrary<$($A),+> {
            type Value = ($($A::Value,)+);

            fn generator(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
                Self::combined(($(self.sources.$idx.generator(gen_size),)+))
            }

            fn generator_with_embedded_edge_cases(&self, gen_size: u32) -> RandomGenerator<Self::Value> {
                Self::combined(($(self.sources.$idx.generator_with_embedded_edge_cases(gen_size),)+))
            }

            fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Self::Value>> {
                $product($(&self.sources.$idx.exhaustive(max_samples)?,)+ max_samples)
            }

            fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Self::Value> {
                let edge_cases = ($(self.sources.$idx.edge_cases(max_edge_cases).into_shrinkables(),)+);
                let defaults = match ($(edge_cases.$idx.first(),)+) {
                    ($(Some($a),)+) => ($($a.clone(),)+),
                    _ => return EdgeCases::none(),
                };
                let mut combined = vec![Shrinkable::new($shrinkable { parts: defaults.clone() })];
                $(
                    for edge_case in edge_cases.$idx.iter().skip(1) {
                        let mut parts = defaults.clone();
                        parts.$idx = edge_case.clone();
                        combined.push(Shrinkable::new($shrinkable { parts }));
                    }
                )+
                EdgeCases::from_shrinkables(combined).limit(max_edge_cases)
            }
        }

        $(#[$meta])*
        pub fn $combine<$($A: Arbitrary),+>($($a: $A),+) -> Combinator<$arbitrary<$($A),+>> {
            Combinator::new($arbitrary { sources: ($($a,)+) })
        }
    };
}

fn product2<A: Value, B: Value>(
    a: &ExhaustiveGenerator<A>,
    b: &ExhaustiveGenerator<B>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<(A, B)>> {
    exhaustive::product(a, b, max_samples)
}

fn product3<A: Value, B: Value, C: Value>(
    a: &ExhaustiveGenerator<A>,
    b: &ExhaustiveGenerator<B>,
    c: &ExhaustiveGenerator<C>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<(A, B, C)>> {
    let ab = exhaustive::product(a, b, max_samples)?;
    Some(exhaustive::product(&ab, c, max_samples)?.map(|((a, b), c)| (a, b, c)))
}

fn product4<A: Value, B: Value, C: Value, D: Value>(
    a: &ExhaustiveGenerator<A>,
    b: &ExhaustiveGenerator<B>,
    c: &ExhaustiveGenerator<C>,
    d: &ExhaustiveGenerator<D>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<(A, B, C, D)>> {
    let abc = product3(a, b, c, max_samples)?;
    Some(exhaustive::product(&abc, d, max_samples)?.map(|((a, b, c), d)| (a, b, c, d)))
}

fn product5<A: Value, B: Value, C: Value, D: Value, E: Value>(
    a: &ExhaustiveGenerator<A>,
    b: &ExhaustiveGenerator<B>,
    c: &ExhaustiveGenerator<C>,
    d: &ExhaustiveGenerator<D>,
    e: &ExhaustiveGenerator<E>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<(A, B, C, D, E)>> {
    let abcd = product4(a, b, c, d, max_samples)?;
    Some(exhaustive::product(&abcd, e, max_samples)?.map(|((a, b, c, d), e)| (a, b, c, d, e)))
}

combination! {
    /// Combines two arbitraries.
    combine2, Combine2, Combined2, product2;
    A a 0, B b 1
}

combination! {
    combine3, Combine3, Combined3, product3;
    A a 0, B b 1, C c 2
}

combination! {
    combine4, Combine4, Combined4, product4;
    A a 0, B b 1, C c 2, D d 3
}

combination! {
    combine5, Combine5, Combined5, product5;
    A a 0, B b 1, C c 2, D d 3, E e 4
}

/// Combines any number of arbitraries of the same type into a list with one
/// value from each.
pub fn combine_all<T: Value>(arbitraries: impl IntoIterator<Item = BoxedArbitrary<T>>) -> Combinator<CombineAll<T>> {
    Combinator::new(CombineAll {
        sources: arbitraries.into_iter().collect(),
    })
}

pub struct CombineAll<T> {
    sources: Vec<BoxedArbitrary<T>>,
}

struct CombinedAll<T> {
    parts: Arc<Vec<Shrinkable<T>>>,
}

impl<T: Value> CombinedAll<T> {
    fn shrinkable(parts: Vec<Shrinkable<T>>) -> Shrinkable<Vec<T>> {
        Shrinkable::new(CombinedAll {
            parts: Arc::new(parts),
        })
    }
}

impl<T: Value> ShrinkableNode<Vec<T>> for CombinedAll<T> {
    fn value(&self) -> Vec<T> {
        self.parts.iter().map(Shrinkable::value).collect()
    }

    fn distance(&self) -> ShrinkingDistance {
        let distances: Vec<ShrinkingDistance> = self.parts.iter().map(Shrinkable::distance).collect();
        ShrinkingDistance::combine(distances.iter())
    }

    fn shrink(&self) -> ShrinkStream<Vec<T>> {
        let parts = Arc::clone(&self.parts);
        Box::new((0..self.parts.len()).flat_map(move |axis| {
            let parts = Arc::clone(&parts);
            let shrinks = parts[axis].shrink();
            shrinks.map(move |candidate| {
                let mut replaced = parts.as_ref().clone();
                replaced[axis] = candidate;
                CombinedAll::shrinkable(replaced)
            })
        }))
    }
}

impl<T: Value> Arbitrary for CombineAll<T> {
    type Value = Vec<T>;

    fn generator(&self, gen_size: u32) -> RandomGenerator<Vec<T>> {
        let generators: Vec<RandomGenerator<T>> = self.sources.iter().map(|a| a.generator(gen_size)).collect();
        RandomGenerator::new(move |rng| {
            let parts = generators
                .iter()
                .map(|generator| generator.next(rng))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CombinedAll::shrinkable(parts))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<Vec<T>>> {
        let generators = self
            .sources
            .iter()
            .map(|arbitrary| arbitrary.exhaustive(max_samples))
            .collect::<Option<Vec<_>>>()?;
        exhaustive::combine(generators, max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<Vec<T>> {
        let components = self
            .sources
            .iter()
            .map(|arbitrary| arbitrary.edge_cases(max_edge_cases).into_shrinkables())
            .collect();
        pairwise_with_default(components, max_edge_cases, CombinedAll::shrinkable)
    }
}
