use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{Resolver, label};
use crate::error::{EntityKind, NamespaceKind, ResolveErrorKind, Result, Role};
use crate::model::{MetricConfig, MetricType, ValueConfig};
use crate::raw::{Named, RawMetric, RawMetricTemplate};

static ATTRIBUTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("attribute name pattern is a valid regex")
});

/// Label names follow Prometheus rules; `__` is reserved.
fn is_valid_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAME.is_match(name) && !name.starts_with("__")
}

/// A resolved metric template: an optional value and optional labels.
#[derive(Debug, Clone)]
pub(crate) struct MetricTemplate {
    value: Option<ValueConfig>,
    attributes: Option<BTreeMap<String, String>>,
}

impl Resolver {
    pub(super) fn resolve_metric_templates(
        &mut self,
        defs: Vec<Named<RawMetricTemplate>>,
    ) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving metric templates");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::template(EntityKind::Metric))?;
            let template = self.scoped(label(EntityKind::Metric, Role::Template), &name, |r| {
                let value = match &definition.value {
                    Some(value) => Some(r.resolve_value_ref(value)?),
                    None => None,
                };
                if let Some(attributes) = &definition.attributes {
                    r.check_attributes(attributes)?;
                }
                Ok(MetricTemplate {
                    value,
                    attributes: definition.attributes.clone(),
                })
            })?;
            tracing::debug!(name = %name, "template metric");
            self.metric_templates.insert(name, template);
        }
        Ok(())
    }

    pub(super) fn resolve_metrics(&mut self, raws: Vec<RawMetric>) -> Result<Vec<MetricConfig>> {
        tracing::debug!(count = raws.len(), "resolving metrics");
        let mut metrics = Vec::with_capacity(raws.len());
        for raw in raws {
            let name = raw.name.display_name().to_owned();
            let metric = self.scoped(EntityKind::Metric, &name, |r| r.resolve_metric(raw))?;
            tracing::debug!(
                prometheus_name = %metric.prometheus_name,
                otel_name = %metric.otel_name,
                kind = %metric.kind,
                source = %metric.value.source.kind,
                "resolved metric"
            );
            metrics.push(metric);
        }
        Ok(metrics)
    }

    fn resolve_metric(&mut self, raw: RawMetric) -> Result<MetricConfig> {
        let template = match &raw.template {
            Some(name) => match self.metric_templates.get(name) {
                Some(template) => Some(template.clone()),
                None => {
                    return self.fail(ResolveErrorKind::TemplateNotFound {
                        kind: EntityKind::Metric,
                        name: name.clone(),
                    });
                }
            },
            None => None,
        };

        let value = match (&raw.value, template.as_ref().and_then(|t| t.value.clone())) {
            (Some(value), _) => self.resolve_value_ref(value)?,
            (None, Some(value)) => value,
            (None, None) => return self.fail(ResolveErrorKind::MissingDefinition(EntityKind::Value)),
        };

        let kind = match MetricType::parse(&raw.kind) {
            Some(kind) => kind,
            None if raw.kind.is_empty() => return self.fail(ResolveErrorKind::Required("type")),
            None => return self.fail(ResolveErrorKind::InvalidMetricType(raw.kind)),
        };
        if raw.description.is_empty() {
            return self.fail(ResolveErrorKind::Required("description"));
        }
        if value.source.kind.is_empty() {
            return self.fail(ResolveErrorKind::Required("value source"));
        }
        if value.source.clock.kind.is_empty() {
            return self.fail(ResolveErrorKind::ClockRequiredInSource);
        }

        let attributes = raw
            .attributes
            .or_else(|| template.and_then(|t| t.attributes))
            .unwrap_or_default();
        self.check_attributes(&attributes)?;

        Ok(MetricConfig {
            prometheus_name: raw.name.prometheus().to_owned(),
            otel_name: raw.name.otel().to_owned(),
            kind,
            description: raw.description,
            value,
            attributes,
        })
    }

    fn check_attributes(&self, attributes: &BTreeMap<String, String>) -> Result<()> {
        match attributes.keys().find(|key| !is_valid_attribute_name(key)) {
            Some(key) => self.fail(ResolveErrorKind::InvalidAttributeName(key.clone())),
            None => Ok(()),
        }
    }
}
