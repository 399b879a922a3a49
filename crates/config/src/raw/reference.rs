//! Polymorphic clock, source and value references.
//!
//! A reference holds exactly one of an instance name, a template name with
//! optional overrides, or an inline definition. Absent fields stay `None`
//! so an unset override never reads as an explicit zero.

use std::time::Duration;

use indexmap::IndexSet;
use serde::Deserialize;

use crate::iterator::Combination;
use crate::model::{ResetConfig, TransformConfig};
use crate::placeholder::Placeholders;

/// `clock:` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawClockRef {
    /// Named clock instance.
    #[serde(default)]
    pub instance: Option<String>,
    /// Clock template to start from.
    #[serde(default)]
    pub template: Option<String>,
    /// Clock type, e.g. `periodic`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Tick interval.
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
}

impl RawClockRef {
    /// Whether any inline or override field is present.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.kind.is_some() || self.interval.is_some()
    }
}

impl Placeholders for RawClockRef {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.instance.collect_placeholders(found);
        self.template.collect_placeholders(found);
        self.kind.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.instance.substitute_placeholders(values);
        self.template.substitute_placeholders(values);
        self.kind.substitute_placeholders(values);
    }
}

/// `source:` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSourceRef {
    /// Named source instance.
    #[serde(default)]
    pub instance: Option<String>,
    /// Source template to start from.
    #[serde(default)]
    pub template: Option<String>,
    /// Source type, e.g. `random_int`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Clock driving the source.
    #[serde(default)]
    pub clock: Option<Box<RawClockRef>>,
    /// Lower bound of generated observations.
    #[serde(default)]
    pub min: Option<i64>,
    /// Upper bound of generated observations.
    #[serde(default)]
    pub max: Option<i64>,
}

impl RawSourceRef {
    /// Whether any inline or override field is present.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.kind.is_some() || self.clock.is_some() || self.min.is_some() || self.max.is_some()
    }
}

impl Placeholders for RawSourceRef {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.instance.collect_placeholders(found);
        self.template.collect_placeholders(found);
        self.kind.collect_placeholders(found);
        self.clock.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.instance.substitute_placeholders(values);
        self.template.substitute_placeholders(values);
        self.kind.substitute_placeholders(values);
        self.clock.substitute_placeholders(values);
    }
}

/// `value:` reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawValueRef {
    /// Named value instance.
    #[serde(default)]
    pub instance: Option<String>,
    /// Value template to start from.
    #[serde(default)]
    pub template: Option<String>,
    /// Source feeding the value.
    #[serde(default)]
    pub source: Option<Box<RawSourceRef>>,
    /// Transform pipeline; replaces the template's list wholesale.
    #[serde(default)]
    pub transforms: Option<Vec<TransformConfig>>,
    /// Reset behaviour.
    #[serde(default)]
    pub reset: Option<ResetConfig>,
}

impl RawValueRef {
    /// Whether any inline or override field is present.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.source.is_some() || self.transforms.is_some() || self.reset.is_some()
    }
}

impl Placeholders for RawValueRef {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.instance.collect_placeholders(found);
        self.template.collect_placeholders(found);
        self.source.collect_placeholders(found);
        self.transforms.collect_placeholders(found);
        self.reset.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.instance.substitute_placeholders(values);
        self.template.substitute_placeholders(values);
        self.source.substitute_placeholders(values);
        self.transforms.substitute_placeholders(values);
        self.reset.substitute_placeholders(values);
    }
}

impl Placeholders for TransformConfig {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.kind.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.kind.substitute_placeholders(values);
    }
}

impl Placeholders for ResetConfig {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.kind.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.kind.substitute_placeholders(values);
    }
}
