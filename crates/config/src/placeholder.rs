//! `{name}` placeholder scanning and substitution.
//!
//! Every expandable raw entity implements [`Placeholders`] by walking its
//! own string fields in a fixed order. The order in which iterator names are
//! first seen decides the iterator order of the combination generator.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::{Captures, Regex};

use crate::iterator::Combination;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("placeholder pattern is a valid regex")
});

/// Append every placeholder name in `text` to `found`, keeping first-seen order.
pub fn scan(text: &str, found: &mut IndexSet<String>) {
    for captures in PLACEHOLDER.captures_iter(text) {
        if let Some(name) = captures.get(1) {
            found.insert(name.as_str().to_owned());
        }
    }
}

/// Replace every `{name}` with its value from `values`.
///
/// Placeholders without a value are left untouched.
#[must_use]
pub fn substitute(text: &str, values: &Combination) -> String {
    PLACEHOLDER
        .replace_all(text, |captures: &Captures<'_>| {
            values
                .get(&captures[1])
                .cloned()
                .unwrap_or_else(|| captures[0].to_owned())
        })
        .into_owned()
}

/// Placeholder capability of an expandable raw entity.
pub trait Placeholders: Clone {
    /// Append referenced iterator names to `found` in field order.
    fn collect_placeholders(&self, found: &mut IndexSet<String>);

    /// Replace placeholders in every string field, in place.
    fn substitute_placeholders(&mut self, values: &Combination);

    /// Iterator names referenced anywhere in the entity.
    fn find_placeholders(&self) -> IndexSet<String> {
        let mut found = IndexSet::new();
        self.collect_placeholders(&mut found);
        found
    }

    /// Copy of the entity with placeholders substituted.
    #[must_use]
    fn substituted(&self, values: &Combination) -> Self {
        let mut copy = self.clone();
        copy.substitute_placeholders(values);
        copy
    }
}

impl Placeholders for String {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        scan(self, found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        *self = substitute(self, values);
    }
}

impl<T: Placeholders> Placeholders for Option<T> {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        if let Some(inner) = self {
            inner.collect_placeholders(found);
        }
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        if let Some(inner) = self {
            inner.substitute_placeholders(values);
        }
    }
}

impl<T: Placeholders> Placeholders for Box<T> {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        (**self).collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        (**self).substitute_placeholders(values);
    }
}

impl<T: Placeholders> Placeholders for Vec<T> {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        for item in self {
            item.collect_placeholders(found);
        }
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        for item in self {
            item.substitute_placeholders(values);
        }
    }
}

/// Attribute maps: keys and values are both scanned and rewritten.
impl Placeholders for BTreeMap<String, String> {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        for (key, value) in self {
            scan(key, found);
            scan(value, found);
        }
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        *self = std::mem::take(self)
            .into_iter()
            .map(|(key, value)| (substitute(&key, values), substitute(&value, values)))
            .collect();
    }
}
