//! As-authored metric entries and metric templates.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::Deserialize;

use super::RawValueRef;
use crate::iterator::Combination;
use crate::placeholder::Placeholders;

/// Metric name: one string for both protocols, or one per protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MetricName {
    /// Same name for Prometheus and OpenTelemetry.
    Simple(String),
    /// Protocol-specific names.
    Full {
        /// Prometheus name.
        #[serde(default)]
        prometheus: Option<String>,
        /// OpenTelemetry name.
        #[serde(default)]
        otel: Option<String>,
    },
}

impl Default for MetricName {
    fn default() -> Self {
        Self::Simple(String::new())
    }
}

impl MetricName {
    /// Name used by the Prometheus exporter; empty if unset.
    #[must_use]
    pub fn prometheus(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Full { prometheus, .. } => prometheus.as_deref().unwrap_or_default(),
        }
    }

    /// Name used by the OpenTelemetry exporter; empty if unset.
    #[must_use]
    pub fn otel(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Full { otel, .. } => otel.as_deref().unwrap_or_default(),
        }
    }

    /// Best name for messages: Prometheus first, then OpenTelemetry.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.prometheus() {
            "" => self.otel(),
            name => name,
        }
    }
}

impl Placeholders for MetricName {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        match self {
            Self::Simple(name) => name.collect_placeholders(found),
            Self::Full { prometheus, otel } => {
                prometheus.collect_placeholders(found);
                otel.collect_placeholders(found);
            }
        }
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        match self {
            Self::Simple(name) => name.substitute_placeholders(values),
            Self::Full { prometheus, otel } => {
                prometheus.substitute_placeholders(values);
                otel.substitute_placeholders(values);
            }
        }
    }
}

/// One entry of the top-level `metrics` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMetric {
    /// Metric name.
    #[serde(default)]
    pub name: MetricName,
    /// `counter` or `gauge`.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Help text.
    #[serde(default, alias = "help")]
    pub description: String,
    /// Metric template supplying value and attributes.
    #[serde(default)]
    pub template: Option<String>,
    /// Value reference.
    #[serde(default)]
    pub value: Option<RawValueRef>,
    /// Labels; replace the template's labels wholesale.
    #[serde(default, alias = "labels")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl Placeholders for RawMetric {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.name.collect_placeholders(found);
        self.kind.collect_placeholders(found);
        self.description.collect_placeholders(found);
        self.template.collect_placeholders(found);
        self.value.collect_placeholders(found);
        self.attributes.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.name.substitute_placeholders(values);
        self.kind.substitute_placeholders(values);
        self.description.substitute_placeholders(values);
        self.template.substitute_placeholders(values);
        self.value.substitute_placeholders(values);
        self.attributes.substitute_placeholders(values);
    }
}

/// `templates.metrics.<name>`: reusable value and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMetricTemplate {
    /// Value reference.
    #[serde(default)]
    pub value: Option<RawValueRef>,
    /// Labels.
    #[serde(default, alias = "labels")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl Placeholders for RawMetricTemplate {
    fn collect_placeholders(&self, found: &mut IndexSet<String>) {
        self.value.collect_placeholders(found);
        self.attributes.collect_placeholders(found);
    }

    fn substitute_placeholders(&mut self, values: &Combination) {
        self.value.substitute_placeholders(values);
        self.attributes.substitute_placeholders(values);
    }
}
