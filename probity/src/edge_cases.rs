//! Finite sets of notable values an arbitrary can produce.

use std::sync::Arc;

use crate::shrinkable::{Shrinkable, Value};

/// Ordered, duplicate-free list of shrinkable edge cases.
///
/// Edge cases are shrinkable like any generated value, so a failure on an
/// edge case still shrinks.
pub struct EdgeCases<T> {
    shrinkables: Vec<Shrinkable<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        Self {
            shrinkables: self.shrinkables.clone(),
        }
    }
}

impl<T: Value> Default for EdgeCases<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Value> EdgeCases<T> {
    pub fn none() -> Self {
        Self {
            shrinkables: Vec::new(),
        }
    }

    /// Keeps the first occurrence of every value.
    pub fn from_shrinkables(shrinkables: impl IntoIterator<Item = Shrinkable<T>>) -> Self {
        let mut unique: Vec<Shrinkable<T>> = Vec::new();
        let mut values: Vec<T> = Vec::new();
        for shrinkable in shrinkables {
            let value = shrinkable.value();
            if !values.contains(&value) {
                values.push(value);
                unique.push(shrinkable);
            }
        }
        Self {
            shrinkables: unique,
        }
    }

    /// Unshrinkable edge cases for the given values.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        Self::from_shrinkables(values.into_iter().map(Shrinkable::unshrinkable))
    }

    /// Union of several edge case lists, in order, capped at `max`.
    pub fn concat(lists: impl IntoIterator<Item = EdgeCases<T>>, max: usize) -> Self {
        Self::from_shrinkables(lists.into_iter().flat_map(|list| list.shrinkables)).limit(max)
    }

    pub fn len(&self) -> usize {
        self.shrinkables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shrinkables.is_empty()
    }

    pub fn first(&self) -> Option<&Shrinkable<T>> {
        self.shrinkables.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shrinkable<T>> + '_ {
        self.shrinkables.iter()
    }

    pub fn values(&self) -> Vec<T> {
        self.shrinkables.iter().map(Shrinkable::value).collect()
    }

    pub fn into_shrinkables(self) -> Vec<Shrinkable<T>> {
        self.shrinkables
    }

    pub fn limit(mut self, max: usize) -> Self {
        self.shrinkables.truncate(max);
        self
    }

    pub fn map<U, F>(&self, mapper: F) -> EdgeCases<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map_with(Arc::new(mapper))
    }

    pub(crate) fn map_with<U: Value>(&self, mapper: Arc<dyn Fn(T) -> U + Send + Sync>) -> EdgeCases<U> {
        EdgeCases::from_shrinkables(
            self.shrinkables
                .iter()
                .map(|shrinkable| shrinkable.map_with(Arc::clone(&mapper))),
        )
    }

    /// Keeps the edge cases satisfying `predicate`; their shrinking keeps
    /// satisfying it as well.
    pub fn filter<F>(&self, predicate: F) -> EdgeCases<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_with(Arc::new(predicate))
    }

    pub(crate) fn filter_with(&self, predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>) -> EdgeCases<T> {
        Self {
            shrinkables: self
                .shrinkables
                .iter()
                .filter(|shrinkable| predicate(&shrinkable.value()))
                .map(|shrinkable| shrinkable.filter_with(Arc::clone(&predicate)))
                .collect(),
        }
    }
}

/// Mutable view handed to edge case configurators.
pub struct EdgeCasesConfig<T> {
    edge_cases: Vec<Shrinkable<T>>,
    factory: Arc<dyn Fn(T) -> Shrinkable<T> + Send + Sync>,
}

impl<T: Value> EdgeCasesConfig<T> {
    /// `factory` turns added values into shrinkables.
    pub fn new(
        edge_cases: EdgeCases<T>,
        factory: Arc<dyn Fn(T) -> Shrinkable<T> + Send + Sync>,
    ) -> Self {
        Self {
            edge_cases: edge_cases.into_shrinkables(),
            factory,
        }
    }

    /// Removes all edge cases.
    pub fn none(&mut self) -> &mut Self {
        self.edge_cases.clear();
        self
    }

    /// Adds a value unless it is already an edge case.
    pub fn add(&mut self, value: T) -> &mut Self {
        if !self.edge_cases.iter().any(|e| e.value() == value) {
            self.edge_cases.push((self.factory)(value));
        }
        self
    }

    /// Keeps only the existing edge cases whose value is listed.
    pub fn include_only(&mut self, values: &[T]) -> &mut Self {
        self.edge_cases.retain(|e| values.contains(&e.value()));
        self
    }

    pub fn filter(&mut self, keep: impl Fn(&T) -> bool) -> &mut Self {
        self.edge_cases.retain(|e| keep(&e.value()));
        self
    }

    pub fn remove(&mut self, matching: impl Fn(&T) -> bool) -> &mut Self {
        self.edge_cases.retain(|e| !matching(&e.value()));
        self
    }

    pub fn map<F>(&mut self, mapper: F) -> &mut Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let mapper: Arc<dyn Fn(T) -> T + Send + Sync> = Arc::new(mapper);
        self.edge_cases = self
            .edge_cases
            .iter()
            .map(|e| e.map_with(Arc::clone(&mapper)))
            .collect();
        self
    }

    pub fn limit(&mut self, max: usize) -> &mut Self {
        self.edge_cases.truncate(max);
        self
    }

    pub fn build(self) -> EdgeCases<T> {
        EdgeCases::from_shrinkables(self.edge_cases)
    }
}
