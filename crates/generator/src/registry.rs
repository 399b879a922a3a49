//! Protocol-agnostic metric descriptors.

use std::collections::BTreeMap;
use std::sync::Arc;

use obsbox_config::{Config, MetricType};
use obsbox_sim::Value;

use crate::error::{GeneratorError, Result};
use crate::generator::Generator;

/// Everything an exporter needs to publish one metric.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Name exposed to Prometheus.
    pub prometheus_name: String,
    /// Name exposed to OpenTelemetry.
    pub otel_name: String,
    /// Counter or gauge.
    pub kind: MetricType,
    /// Help text.
    pub description: String,
    /// Labels, sorted by key.
    pub attributes: BTreeMap<String, String>,
    /// Runtime value. Reading it may reset it.
    pub value: Arc<Value>,
}

/// Ordered descriptors, one per configured metric.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    descriptors: Vec<Descriptor>,
}

impl MetricRegistry {
    /// Pair each resolved metric with the value the generator built for it.
    pub fn new(config: &Config, generator: &Generator) -> Result<Self> {
        let descriptors = config
            .metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| {
                let value = generator
                    .get_value(index)
                    .ok_or_else(|| GeneratorError::ValueNotFound {
                        index,
                        metric: metric.display_name().to_owned(),
                    })?;
                tracing::debug!(name = %metric.prometheus_name, kind = %metric.kind, "registered metric");
                Ok(Descriptor {
                    prometheus_name: metric.prometheus_name.clone(),
                    otel_name: metric.otel_name.clone(),
                    kind: metric.kind,
                    description: metric.description.clone(),
                    attributes: metric.attributes.clone(),
                    value: Arc::clone(value),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { descriptors })
    }

    /// Descriptors in declaration order.
    #[must_use]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Iterate descriptors in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no metric is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetricRegistry {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
