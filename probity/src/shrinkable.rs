//! Generated values paired with their shrinking behaviour.
//!
//! A [`Shrinkable`] owns a value, a [`ShrinkingDistance`] and a lazy stream of
//! smaller candidates. Every candidate in a shrink stream has a distance less
//! than or equal to the distance of the shrinkable it came from, which is what
//! lets the shrink engine terminate.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::arbitrary::Arbitrary;
use crate::distance::ShrinkingDistance;
use crate::error::GenerationError;
use crate::generator::RandomGenerator;

/// Bound shared by every generated value.
pub trait Value: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

impl<T> Value for T where T: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {}

/// Lazy stream of shrink candidates.
pub type ShrinkStream<T> = Box<dyn Iterator<Item = Shrinkable<T>>>;

/// Upper bound on candidates a filtered shrinkable rejects while searching
/// for a passing descendant.
const MAX_FILTER_REJECTIONS: usize = 10_000;

/// Shrinking behaviour behind a [`Shrinkable`].
pub trait ShrinkableNode<T>: Send + Sync {
    /// Materializes the value. Nodes built from a supplier produce a fresh
    /// instance on every call.
    fn value(&self) -> T;

    fn distance(&self) -> ShrinkingDistance;

    /// Candidates ordered from most to least aggressive.
    fn shrink(&self) -> ShrinkStream<T>;

    /// Enlarges this value by the amount a sibling was shrunk from `before`
    /// to `after`. Both arguments are sibling values of type `T`.
    fn grow(&self, _before: &dyn Any, _after: &dyn Any) -> Option<Shrinkable<T>> {
        None
    }

    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A generated value that knows how to produce smaller versions of itself.
pub struct Shrinkable<T> {
    node: Arc<dyn ShrinkableNode<T>>,
}

impl<T> Clone for Shrinkable<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T: Value> Shrinkable<T> {
    pub fn new<N>(node: N) -> Self
    where
        N: ShrinkableNode<T> + 'static,
    {
        Self {
            node: Arc::new(node),
        }
    }

    /// A value with no shrink candidates and minimal distance.
    pub fn unshrinkable(value: T) -> Self {
        Self::unshrinkable_with_distance(value, ShrinkingDistance::min())
    }

    pub fn unshrinkable_with_distance(value: T, distance: ShrinkingDistance) -> Self {
        Self::new(Unshrinkable { value, distance })
    }

    /// A value produced freshly by `supplier` every time it is materialized.
    pub fn supplied<F>(supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Supplied {
            supplier: Arc::new(supplier),
        })
    }

    pub fn value(&self) -> T {
        self.node.value()
    }

    pub fn distance(&self) -> ShrinkingDistance {
        self.node.distance()
    }

    pub fn shrink(&self) -> ShrinkStream<T> {
        self.node.shrink()
    }

    pub fn grow(&self, before: &dyn Any, after: &dyn Any) -> Option<Shrinkable<T>> {
        self.node.grow(before, after)
    }

    /// Name of the concrete shrinking behaviour, used to decide whether two
    /// shrinkables may be ordered by value.
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Applies `mapper` to the value and to every shrink candidate. The
    /// distance is that of the source.
    pub fn map<U, F>(&self, mapper: F) -> Shrinkable<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_with(Arc::new(mapper))
    }

    pub(crate) fn map_with<U: Value>(
        &self,
        mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
    ) -> Shrinkable<U> {
        Shrinkable::new(Mapped {
            source: self.clone(),
            mapper,
        })
    }

    /// Restricts shrink candidates to those satisfying `predicate`.
    ///
    /// Rejected candidates are searched lazily for passing descendants. The
    /// value itself is assumed to satisfy the predicate already.
    pub fn filter<F>(&self, predicate: F) -> Shrinkable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Arc::new(predicate))
    }

    pub(crate) fn filter_with(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> Shrinkable<T> {
        Shrinkable::new(Filtered {
            source: self.clone(),
            predicate,
        })
    }

    /// Draws a dependent value from the arbitrary `mapper` returns for this
    /// value, using a random source seeded with `seed`.
    ///
    /// Shrinking first shrinks this value and regenerates the dependent value
    /// with the same seed, then shrinks the dependent value.
    pub fn flat_map<A, F>(
        &self,
        mapper: F,
        gen_size: u32,
        seed: u64,
    ) -> Result<Shrinkable<A::Value>, GenerationError>
    where
        A: Arbitrary,
        F: Fn(T) -> A + Send + Sync + 'static,
    {
        let generators: Arc<dyn Fn(T) -> RandomGenerator<A::Value> + Send + Sync> =
            Arc::new(move |value| mapper(value).generator(gen_size));
        FlatMapped::generate(self.clone(), generators, seed).map(Shrinkable::new)
    }

    /// Same value and distance with an empty shrink stream.
    pub fn make_unshrinkable(&self) -> Shrinkable<T> {
        Shrinkable::new(Frozen {
            source: self.clone(),
        })
    }

    /// Orders by distance. Ties between shrinkables of the same kind are
    /// broken by the values' natural ordering.
    pub fn compare(&self, other: &Shrinkable<T>) -> Ordering
    where
        T: PartialOrd,
    {
        match self.distance().cmp(&other.distance()) {
            Ordering::Equal if self.kind() == other.kind() => self
                .value()
                .partial_cmp(&other.value())
                .unwrap_or(Ordering::Equal),
            ordering => ordering,
        }
    }
}

impl<T: Value> fmt::Debug for Shrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", &self.value())
            .field("distance", &self.distance())
            .finish()
    }
}

struct Unshrinkable<T> {
    value: T,
    distance: ShrinkingDistance,
}

impl<T: Value> ShrinkableNode<T> for Unshrinkable<T> {
    fn value(&self) -> T {
        self.value.clone()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.distance.clone()
    }

    fn shrink(&self) -> ShrinkStream<T> {
        Box::new(std::iter::empty())
    }
}

struct Supplied<T> {
    supplier: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T: Value> ShrinkableNode<T> for Supplied<T> {
    fn value(&self) -> T {
        (self.supplier)()
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::min()
    }

    fn shrink(&self) -> ShrinkStream<T> {
        Box::new(std::iter::empty())
    }
}

struct Frozen<T> {
    source: Shrinkable<T>,
}

impl<T: Value> ShrinkableNode<T> for Frozen<T> {
    fn value(&self) -> T {
        self.source.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkStream<T> {
        Box::new(std::iter::empty())
    }
}

struct Mapped<T, U> {
    source: Shrinkable<T>,
    mapper: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T: Value, U: Value> ShrinkableNode<U> for Mapped<T, U> {
    fn value(&self) -> U {
        (self.mapper)(self.source.value())
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkStream<U> {
        let mapper = Arc::clone(&self.mapper);
        Box::new(
            self.source
                .shrink()
                .map(move |candidate| candidate.map_with(Arc::clone(&mapper))),
        )
    }
}

struct Filtered<T> {
    source: Shrinkable<T>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: Value> ShrinkableNode<T> for Filtered<T> {
    fn value(&self) -> T {
        self.source.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkStream<T> {
        let predicate = Arc::clone(&self.predicate);
        let mut rejections = 0usize;
        let mut pending: Vec<ShrinkStream<T>> = vec![self.source.shrink()];
        Box::new(std::iter::from_fn(move || {
            while let Some(stream) = pending.last_mut() {
                let Some(candidate) = stream.next() else {
                    pending.pop();
                    continue;
                };
                if predicate(&candidate.value()) {
                    return Some(candidate.filter_with(Arc::clone(&predicate)));
                }
                rejections += 1;
                if rejections >= MAX_FILTER_REJECTIONS {
                    return None;
                }
                pending.push(candidate.shrink());
            }
            None
        }))
    }

    fn grow(&self, before: &dyn Any, after: &dyn Any) -> Option<Shrinkable<T>> {
        self.source
            .grow(before, after)
            .filter(|grown| (self.predicate)(&grown.value()))
            .map(|grown| grown.filter_with(Arc::clone(&self.predicate)))
    }
}

/// Value drawn from a generator chosen by another value.
pub(crate) struct FlatMapped<T, U> {
    outer: Shrinkable<T>,
    generators: Arc<dyn Fn(T) -> RandomGenerator<U> + Send + Sync>,
    seed: u64,
    inner: Shrinkable<U>,
}

impl<T: Value, U: Value> FlatMapped<T, U> {
    pub(crate) fn generate(
        outer: Shrinkable<T>,
        generators: Arc<dyn Fn(T) -> RandomGenerator<U> + Send + Sync>,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let inner = generators(outer.value()).next(&mut rng)?;
        Ok(Self {
            outer,
            generators,
            seed,
            inner,
        })
    }
}

impl<T: Value, U: Value> ShrinkableNode<U> for FlatMapped<T, U> {
    fn value(&self) -> U {
        self.inner.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.outer.distance().append(&self.inner.distance())
    }

    fn shrink(&self) -> ShrinkStream<U> {
        let seed = self.seed;
        let generators = Arc::clone(&self.generators);
        let regenerated = self.outer.shrink().filter_map(move |outer| {
            FlatMapped::generate(outer, Arc::clone(&generators), seed)
                .ok()
                .map(Shrinkable::new)
        });

        let outer = self.outer.clone();
        let generators = Arc::clone(&self.generators);
        let inner_shrunk = self.inner.shrink().map(move |inner| {
            Shrinkable::new(FlatMapped {
                outer: outer.clone(),
                generators: Arc::clone(&generators),
                seed,
                inner,
            })
        });

        Box::new(regenerated.chain(inner_shrunk))
    }
}
