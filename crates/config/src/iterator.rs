//! Iterator engine: named value generators and their Cartesian product.
//!
//! An iterator never materializes its values; [`PlaceholderIterator::value_at`]
//! computes the value for an index on demand. A [`CombinationGenerator`]
//! decodes a linear index into one value per iterator using mixed radix,
//! with the first iterator varying fastest.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::IteratorError;
use crate::raw::RawIterator;

/// One assignment of values to iterators, keyed by iterator name.
pub type Combination = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Values {
    Range { start: i64, len: usize },
    List(Arc<[String]>),
}

/// A named, deterministic `index -> string` generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderIterator {
    name: String,
    values: Values,
}

impl PlaceholderIterator {
    /// Integer range `start..=end`.
    ///
    /// An inverted range (`end < start`) is empty rather than an error.
    pub fn range(name: impl Into<String>, start: i64, end: i64) -> Self {
        let span = i128::from(end) - i128::from(start) + 1;
        let len = if span > 0 {
            usize::try_from(span).unwrap_or(usize::MAX)
        } else {
            0
        };
        Self {
            name: name.into(),
            values: Values::Range { start, len },
        }
    }

    /// Explicit list of values, copied from the input.
    pub fn list<S: AsRef<str>>(name: impl Into<String>, values: &[S]) -> Self {
        Self {
            name: name.into(),
            values: Values::List(values.iter().map(|v| v.as_ref().to_owned()).collect()),
        }
    }

    /// Iterator name as used in `{name}` placeholders.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.values {
            Values::Range { len, .. } => *len,
            Values::List(values) => values.len(),
        }
    }

    /// Whether the iterator yields no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, or `None` when out of range.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<String> {
        match &self.values {
            Values::Range { start, len } => {
                (index < *len).then(|| (i128::from(*start) + index as i128).to_string())
            }
            Values::List(values) => values.get(index).cloned(),
        }
    }
}

impl TryFrom<&RawIterator> for PlaceholderIterator {
    type Error = IteratorError;

    fn try_from(raw: &RawIterator) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "range" => {
                let start = raw.start.ok_or_else(|| IteratorError::MissingBound {
                    name: raw.name.clone(),
                    field: "start",
                })?;
                let end = raw.end.ok_or_else(|| IteratorError::MissingBound {
                    name: raw.name.clone(),
                    field: "end",
                })?;
                Ok(Self::range(&raw.name, start, end))
            }
            "list" => match raw.values.as_deref() {
                Some(values) if !values.is_empty() => Ok(Self::list(&raw.name, values)),
                _ => Err(IteratorError::MissingValues(raw.name.clone())),
            },
            other => Err(IteratorError::UnknownType {
                name: raw.name.clone(),
                kind: other.to_owned(),
            }),
        }
    }
}

/// Name-unique collection of iterators.
#[derive(Debug, Clone, Default)]
pub struct IteratorRegistry {
    iterators: IndexMap<String, PlaceholderIterator>,
}

impl IteratorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from raw definitions, in declaration order.
    pub fn from_definitions(definitions: &[RawIterator]) -> Result<Self, IteratorError> {
        let mut registry = Self::new();
        for raw in definitions {
            registry.register(PlaceholderIterator::try_from(raw)?)?;
        }
        Ok(registry)
    }

    /// Add an iterator; fails if the name is taken.
    pub fn register(&mut self, iterator: PlaceholderIterator) -> Result<(), IteratorError> {
        if self.iterators.contains_key(iterator.name()) {
            return Err(IteratorError::Duplicate(iterator.name.clone()));
        }
        tracing::debug!(name = %iterator.name(), count = iterator.len(), "registered iterator");
        self.iterators.insert(iterator.name.clone(), iterator);
        Ok(())
    }

    /// Look up a single iterator.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PlaceholderIterator> {
        self.iterators.get(name)
    }

    /// Fetch iterators by name, preserving the requested order.
    pub fn get_iterators<'a, I>(&self, names: I) -> Result<Vec<PlaceholderIterator>, IteratorError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| IteratorError::Undefined(name.to_owned()))
            })
            .collect()
    }

    /// Number of registered iterators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iterators.len()
    }

    /// Whether no iterator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iterators.is_empty()
    }
}

/// Lazy Cartesian product over an ordered list of iterators.
///
/// For iterator `i`, `radix_i` is the product of the lengths of all
/// iterators before it, and its value index for combination `n` is
/// `(n / radix_i) % len_i`.
#[derive(Debug, Clone)]
pub struct CombinationGenerator {
    iterators: Vec<PlaceholderIterator>,
    total: usize,
}

impl CombinationGenerator {
    /// Build a generator; fails if the product overflows `usize`.
    ///
    /// An empty iterator list yields a total of zero.
    pub fn new(iterators: Vec<PlaceholderIterator>) -> Result<Self, IteratorError> {
        let total = if iterators.is_empty() {
            0
        } else {
            iterators.iter().try_fold(1usize, |acc, it| {
                acc.checked_mul(it.len())
                    .ok_or(IteratorError::CombinationOverflow)
            })?
        };
        Ok(Self { iterators, total })
    }

    /// Number of combinations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Decode combination `index`, or `None` when `index >= total`.
    #[must_use]
    pub fn generate(&self, index: usize) -> Option<Combination> {
        if index >= self.total {
            return None;
        }
        let mut radix = 1usize;
        let mut combination = Combination::with_capacity(self.iterators.len());
        for iterator in &self.iterators {
            let len = iterator.len();
            let value = iterator.value_at((index / radix) % len)?;
            combination.insert(iterator.name.clone(), value);
            radix *= len;
        }
        Some(combination)
    }

    /// All combinations in index order.
    pub fn iter(&self) -> impl Iterator<Item = Combination> + '_ {
        (0..self.total).filter_map(|index| self.generate(index))
    }

    /// Call `f` for every combination in index order, stopping at the first error.
    pub fn for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(Combination) -> Result<(), E>,
    {
        self.iter().try_for_each(&mut f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn raw(name: &str, kind: &str) -> RawIterator {
        RawIterator {
            name: name.into(),
            kind: kind.into(),
            start: None,
            end: None,
            values: None,
        }
    }

    #[test]
    fn range_is_inclusive() {
        let it = PlaceholderIterator::range("i", 3, 5);
        assert_eq!(it.len(), 3);
        assert_eq!(it.value_at(0).as_deref(), Some("3"));
        assert_eq!(it.value_at(2).as_deref(), Some("5"));
        assert_eq!(it.value_at(3), None);
    }

    #[test]
    fn inverted_range_is_empty() {
        let it = PlaceholderIterator::range("i", 5, 4);
        assert!(it.is_empty());
        assert_eq!(it.value_at(0), None);
    }

    #[test]
    fn list_copies_values() {
        let mut source = vec!["a".to_owned(), "b".to_owned()];
        let it = PlaceholderIterator::list("l", &source);
        source[0] = "z".into();
        assert_eq!(it.value_at(0).as_deref(), Some("a"));
        assert_eq!(it.len(), 2);
    }

    #[test]
    fn registry_rejects_duplicates() {
        let mut registry = IteratorRegistry::new();
        registry.register(PlaceholderIterator::range("i", 0, 1)).unwrap();
        let err = registry
            .register(PlaceholderIterator::list("i", &["x"]))
            .unwrap_err();
        assert_eq!(err, IteratorError::Duplicate("i".into()));
    }

    #[test]
    fn registry_reports_undefined_names() {
        let mut registry = IteratorRegistry::new();
        registry.register(PlaceholderIterator::range("i", 0, 1)).unwrap();
        let err = registry.get_iterators(["i", "missing"]).unwrap_err();
        assert_eq!(err, IteratorError::Undefined("missing".into()));
    }

    #[test]
    fn raw_range_requires_bounds() {
        let mut def = raw("i", "range");
        def.start = Some(1);
        let err = PlaceholderIterator::try_from(&def).unwrap_err();
        assert_eq!(err.to_string(), "iterator \"i\": end required for range type");
    }

    #[test]
    fn raw_list_requires_values() {
        let mut def = raw("l", "list");
        def.values = Some(Vec::new());
        assert_eq!(
            PlaceholderIterator::try_from(&def).unwrap_err(),
            IteratorError::MissingValues("l".into())
        );
    }

    #[test]
    fn raw_unknown_type_is_rejected() {
        let err = PlaceholderIterator::try_from(&raw("x", "cycle")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "iterator \"x\": unknown type \"cycle\" (must be range or list)"
        );
    }

    #[test]
    fn first_iterator_varies_fastest() {
        let generator = CombinationGenerator::new(vec![
            PlaceholderIterator::list("a", &["x", "y"]),
            PlaceholderIterator::range("b", 1, 3),
        ])
        .unwrap();
        assert_eq!(generator.total(), 6);

        let pairs: Vec<(String, String)> = generator
            .iter()
            .map(|c| (c["a"].clone(), c["b"].clone()))
            .collect();
        let expected: Vec<(String, String)> = [
            ("x", "1"),
            ("y", "1"),
            ("x", "2"),
            ("y", "2"),
            ("x", "3"),
            ("y", "3"),
        ]
        .iter()
        .map(|(a, b)| ((*a).to_owned(), (*b).to_owned()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn empty_iterator_list_has_zero_total() {
        let generator = CombinationGenerator::new(Vec::new()).unwrap();
        assert_eq!(generator.total(), 0);
        assert_eq!(generator.generate(0), None);
    }

    #[test]
    fn overflowing_product_is_an_error() {
        let huge = PlaceholderIterator::range("h", i64::MIN, i64::MAX);
        let err = CombinationGenerator::new(vec![huge.clone(), huge]).unwrap_err();
        assert_eq!(err, IteratorError::CombinationOverflow);
    }

    #[test]
    fn for_each_stops_at_first_error() {
        let generator =
            CombinationGenerator::new(vec![PlaceholderIterator::range("i", 0, 9)]).unwrap();
        let mut seen = 0;
        let result = generator.for_each(|c| {
            seen += 1;
            if c["i"] == "3" { Err("stop") } else { Ok(()) }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(seen, 4);
    }

    proptest! {
        #[test]
        fn range_values_follow_start(start in -1_000i64..1_000, width in 0i64..50) {
            let it = PlaceholderIterator::range("i", start, start + width);
            prop_assert_eq!(it.len() as i64, width + 1);
            for i in 0..it.len() {
                prop_assert_eq!(it.value_at(i), Some((start + i as i64).to_string()));
            }
        }

        #[test]
        fn inverted_ranges_are_empty(start in -1_000i64..1_000, gap in 1i64..50) {
            prop_assert!(PlaceholderIterator::range("i", start, start - gap).is_empty());
        }
    }
}
