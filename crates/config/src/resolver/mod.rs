//! Template, instance and metric resolution.
//!
//! Resolution runs in a fixed phase order, each phase seeing only the
//! results of earlier ones: iterator expansion, template clocks, instance
//! clocks, template sources, instance sources, template values, instance
//! values, metric templates, metrics, export, settings.
//!
//! Every nested clock/source/value reference follows the same contract:
//!
//! | Form | Result |
//! |---|---|
//! | `instance: X` | instance `X` verbatim; no other field allowed |
//! | `template: X` + fields | template `X` with each given field replaced |
//! | fields only | standalone inline definition |
//!
//! Only instance references record the instance name in the resolved
//! entity (`clock_ref`, `source_ref`); that is what later decides whether a
//! runtime object is shared.

mod clock;
mod context;
mod metric;
mod namespace;
mod source;
mod value;

use indexmap::IndexMap;

use crate::error::{EntityKind, ResolveErrorKind, Result, Role};
use crate::export::ExportConfig;
use crate::model::{ClockConfig, Config, InstanceRegistry, ValueConfig};
use crate::raw::RawConfig;
use crate::settings::Settings;

use context::Context;
use metric::MetricTemplate;
use namespace::Namespace;
use source::SourceDraft;

/// Single-use resolver: build one, call [`Resolver::resolve`], drop it.
#[derive(Debug, Default)]
pub struct Resolver {
    namespace: Namespace,
    context: Context,
    clock_templates: IndexMap<String, ClockConfig>,
    source_templates: IndexMap<String, SourceDraft>,
    value_templates: IndexMap<String, ValueConfig>,
    metric_templates: IndexMap<String, MetricTemplate>,
    instances: InstanceRegistry,
}

impl Resolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand and resolve `raw` into a [`Config`].
    ///
    /// Templates are discarded; instances and metrics are kept.
    pub fn resolve(mut self, mut raw: RawConfig) -> Result<Config> {
        raw.expand()?;

        self.resolve_template_clocks(std::mem::take(&mut raw.templates.clocks))?;
        self.resolve_instance_clocks(std::mem::take(&mut raw.instances.clocks))?;
        self.resolve_template_sources(std::mem::take(&mut raw.templates.sources))?;
        self.resolve_instance_sources(std::mem::take(&mut raw.instances.sources))?;
        self.resolve_template_values(std::mem::take(&mut raw.templates.values))?;
        self.resolve_instance_values(std::mem::take(&mut raw.instances.values))?;
        self.resolve_metric_templates(std::mem::take(&mut raw.templates.metrics))?;
        let metrics = self.resolve_metrics(std::mem::take(&mut raw.metrics))?;

        let export = ExportConfig::resolve(&raw.export)?;
        let settings = Settings::resolve(&raw.settings)?;

        tracing::debug!(
            names = self.namespace.len(),
            clocks = self.instances.clocks.len(),
            sources = self.instances.sources.len(),
            values = self.instances.values.len(),
            metrics = metrics.len(),
            "configuration resolved"
        );

        Ok(Config {
            instances: self.instances,
            metrics,
            export,
            settings,
        })
    }

    /// Run `f` with an extra context frame.
    fn scoped<T>(
        &mut self,
        label: impl std::fmt::Display,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.context.push(label, name);
        let result = f(self);
        self.context.pop();
        result
    }

    fn fail<T>(&self, kind: ResolveErrorKind) -> Result<T> {
        Err(self.context.error(kind))
    }
}

/// Context label of a named definition, e.g. `clock template`.
fn label(entity: EntityKind, role: Role) -> String {
    format!("{entity} {role}")
}

/// Expand and resolve a raw configuration.
pub fn resolve(raw: RawConfig) -> Result<Config> {
    Resolver::new().resolve(raw)
}
