//! As-authored configuration, straight from YAML.
//!
//! The raw model is deliberately loose: every reference field is optional
//! and nothing is cross-checked here. [`RawConfig::expand`] multiplies
//! parametrized entries and [`crate::resolve`] turns the result into a
//! [`crate::Config`].

mod export;
mod metric;
mod reference;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer};

pub use export::{
    RawExport, RawInternalMetrics, RawInterval, RawOtelExport, RawPrometheusExport, RawSettings,
};
pub use metric::{MetricName, RawMetric, RawMetricTemplate};
pub use reference::{RawClockRef, RawSourceRef, RawValueRef};

use crate::iterator::Combination;
use crate::placeholder::Placeholders;

/// Iterator definition from the `iterators` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawIterator {
    /// Name used in `{name}` placeholders.
    pub name: String,
    /// `range` or `list`.
    #[serde(rename = "type")]
    pub kind: String,
    /// First value of a range.
    #[serde(default)]
    pub start: Option<i64>,
    /// Last value of a range, inclusive.
    #[serde(default)]
    pub end: Option<i64>,
    /// Values of a list.
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

/// A template or instance definition together with its name.
///
/// Definitions are authored as YAML maps and kept as ordered lists so that
/// names produced twice by expansion are still seen by the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named<T> {
    /// Map key.
    pub name: String,
    /// Definition body.
    pub definition: T,
}

impl<T> Named<T> {
    /// Pair a name with its definition.
    pub fn new(name: impl Into<String>, definition: T) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }
}

impl<T: Placeholders> Placeholders for Named<T> {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.name.collect_placeholders(found);
        self.definition.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.name.substitute_placeholders(values);
        self.definition.substitute_placeholders(values);
    }
}

fn named<'de, D, T>(deserializer: D) -> Result<Vec<Named<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let map = Option::<IndexMap<String, T>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(name, definition)| Named { name, definition })
        .collect())
}

/// `templates:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTemplates {
    /// Clock templates.
    #[serde(default, deserialize_with = "named")]
    pub clocks: Vec<Named<RawClockRef>>,
    /// Source templates.
    #[serde(default, deserialize_with = "named")]
    pub sources: Vec<Named<RawSourceRef>>,
    /// Value templates.
    #[serde(default, deserialize_with = "named")]
    pub values: Vec<Named<RawValueRef>>,
    /// Metric templates.
    #[serde(default, deserialize_with = "named")]
    pub metrics: Vec<Named<RawMetricTemplate>>,
}

/// `instances:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInstances {
    /// Clock instances.
    #[serde(default, deserialize_with = "named")]
    pub clocks: Vec<Named<RawClockRef>>,
    /// Source instances.
    #[serde(default, deserialize_with = "named")]
    pub sources: Vec<Named<RawSourceRef>>,
    /// Value instances.
    #[serde(default, deserialize_with = "named")]
    pub values: Vec<Named<RawValueRef>>,
}

/// The whole configuration file as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Iterator definitions; emptied by [`RawConfig::expand`].
    #[serde(default)]
    pub iterators: Vec<RawIterator>,
    /// Reusable definitions.
    #[serde(default)]
    pub templates: RawTemplates,
    /// Shared definitions.
    #[serde(default)]
    pub instances: RawInstances,
    /// Metrics, in exposition order.
    #[serde(default)]
    pub metrics: Vec<RawMetric>,
    /// Exporter settings.
    #[serde(default)]
    pub export: RawExport,
    /// General settings.
    #[serde(default)]
    pub settings: RawSettings,
}
