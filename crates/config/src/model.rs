//! Resolved configuration model.
//!
//! Everything here is fully materialized: no outstanding references, no
//! templates. Only instances and metrics survive resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::export::ExportConfig;
use crate::settings::Settings;

/// A transform stage applied to a value's observations.
///
/// Accepts the shorthand `accumulate` or the object form `{type: accumulate}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransformRepr")]
pub struct TransformConfig {
    /// Transform type, e.g. `accumulate`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TransformConfig {
    /// Transform of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TransformRepr {
    Short(String),
    Full {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl From<TransformRepr> for TransformConfig {
    fn from(repr: TransformRepr) -> Self {
        match repr {
            TransformRepr::Short(kind) | TransformRepr::Full { kind } => Self { kind },
        }
    }
}

/// Reset behaviour of a value.
///
/// Accepts the shorthand `on_read` (reset to zero) or
/// `{type: on_read, value: 10}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResetRepr")]
pub struct ResetConfig {
    /// Reset type, e.g. `on_read`.
    #[serde(rename = "type")]
    pub kind: String,
    /// State after a reset.
    pub value: i64,
}

impl ResetConfig {
    /// Reset of the given type back to `value`.
    pub fn new(kind: impl Into<String>, value: i64) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResetRepr {
    Short(String),
    Full {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        value: i64,
    },
}

impl From<ResetRepr> for ResetConfig {
    fn from(repr: ResetRepr) -> Self {
        match repr {
            ResetRepr::Short(kind) => Self { kind, value: 0 },
            ResetRepr::Full { kind, value } => Self { kind, value },
        }
    }
}

/// Resolved clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockConfig {
    /// Clock type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tick interval, always positive.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

/// Resolved source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceConfig {
    /// Source type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Clock driving the source.
    pub clock: ClockConfig,
    /// Name of the clock instance, set only when the clock came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_ref: Option<String>,
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueConfig {
    /// Source feeding the value.
    pub source: SourceConfig,
    /// Name of the source instance, set only when the source came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    /// Transform pipeline, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformConfig>,
    /// Reset behaviour, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<ResetConfig>,
}

/// Metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Monotonic counter.
    Counter,
    /// Point-in-time gauge.
    Gauge,
}

impl MetricType {
    /// Parse `counter` or `gauge`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "counter" => Some(Self::Counter),
            "gauge" => Some(Self::Gauge),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricConfig {
    /// Name exposed to Prometheus.
    pub prometheus_name: String,
    /// Name exposed to OpenTelemetry.
    pub otel_name: String,
    /// Counter or gauge.
    #[serde(rename = "type")]
    pub kind: MetricType,
    /// Help text.
    pub description: String,
    /// Value backing the metric.
    pub value: ValueConfig,
    /// Labels, sorted by key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl MetricConfig {
    /// Name for messages: the Prometheus name, or the OTel name when only
    /// that one is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.prometheus_name.is_empty() {
            &self.otel_name
        } else {
            &self.prometheus_name
        }
    }
}

/// Named instances retained after resolution, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceRegistry {
    /// Clock instances.
    pub clocks: IndexMap<String, ClockConfig>,
    /// Source instances.
    pub sources: IndexMap<String, SourceConfig>,
    /// Value instances.
    pub values: IndexMap<String, ValueConfig>,
}

impl InstanceRegistry {
    /// Total number of instances of every kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clocks.len() + self.sources.len() + self.values.len()
    }

    /// Whether no instance is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fully resolved configuration. Immutable once returned by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Named instances.
    pub instances: InstanceRegistry,
    /// Metrics in declaration order.
    pub metrics: Vec<MetricConfig>,
    /// Exporter settings.
    pub export: ExportConfig,
    /// General settings.
    pub settings: Settings,
}
