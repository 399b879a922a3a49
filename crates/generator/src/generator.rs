//! Runtime graph construction and lifecycle.
//!
//! Metrics are walked in declaration order. Objects that came from a named
//! instance are cached by name and shared; inline objects are built fresh
//! every time. Only unique objects enter the ownership lists, so each clock
//! is started and stopped exactly once no matter how many sources it drives.

use std::collections::HashMap;
use std::sync::Arc;

use obsbox_config::{ClockConfig, Config, MetricConfig, SourceConfig, ValueConfig};
use obsbox_sim::{Clock, Reset, SimError, Source, Transform, Value};

use crate::error::{GeneratorError, Result, Stage};

const INLINE: &str = "<inline>";

/// Owns every clock, source and value backing the configured metrics.
#[derive(Debug, Default)]
pub struct Generator {
    clocks: Vec<Arc<Clock>>,
    sources: Vec<Arc<Source>>,
    values: Vec<Arc<Value>>,

    clock_instances: HashMap<String, Arc<Clock>>,
    source_instances: HashMap<String, Arc<Source>>,

    metric_values: Vec<Arc<Value>>,
    seed: Option<u64>,
}

/// Identifies the metric whose objects are being built, for error context.
struct Building<'a> {
    index: usize,
    metric: &'a MetricConfig,
}

impl Building<'_> {
    fn fail(&self, stage: Stage, instance: Option<&str>) -> impl FnOnce(SimError) -> GeneratorError {
        let index = self.index;
        let metric = self.metric.display_name().to_owned();
        let instance = instance.map(str::to_owned);
        move |source| GeneratorError::Build {
            index,
            metric,
            stage,
            instance,
            source,
        }
    }
}

impl Generator {
    /// Build the runtime graph for every metric in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut generator = Self {
            seed: config.settings.seed,
            metric_values: Vec::with_capacity(config.metrics.len()),
            ..Self::default()
        };

        for (index, metric) in config.metrics.iter().enumerate() {
            let building = Building { index, metric };
            let source = generator.source_for(&building, &metric.value)?;
            let value = generator.create_value(&building, &metric.value, source)?;
            generator.metric_values.push(value);

            tracing::debug!(
                metric = metric.display_name(),
                kind = %metric.kind,
                attributes = metric.attributes.len(),
                "created metric"
            );
        }

        tracing::debug!(
            clocks = generator.clocks.len(),
            sources = generator.sources.len(),
            values = generator.values.len(),
            metrics = generator.metric_values.len(),
            "built runtime graph"
        );
        Ok(generator)
    }

    fn clock_for(&mut self, building: &Building<'_>, source: &SourceConfig) -> Result<Arc<Clock>> {
        let name = source.clock_ref.as_deref();
        if let Some(clock) = name.and_then(|n| self.clock_instances.get(n)) {
            return Ok(Arc::clone(clock));
        }

        let ClockConfig { kind, interval } = &source.clock;
        let clock = Clock::from_kind(kind, *interval).map_err(building.fail(Stage::Clock, name))?;
        if let Some(name) = name {
            self.clock_instances.insert(name.to_owned(), Arc::clone(&clock));
        }
        self.clocks.push(Arc::clone(&clock));

        tracing::debug!(
            name = name.unwrap_or(INLINE),
            kind = %kind,
            interval = ?interval,
            "created clock"
        );
        Ok(clock)
    }

    fn source_for(&mut self, building: &Building<'_>, value: &ValueConfig) -> Result<Arc<Source>> {
        let name = value.source_ref.as_deref();
        if let Some(source) = name.and_then(|n| self.source_instances.get(n)) {
            return Ok(Arc::clone(source));
        }

        let config = &value.source;
        let clock = self.clock_for(building, config)?;
        let seed = self
            .seed
            .map(|base| base.wrapping_add(self.sources.len() as u64));
        let source = Source::from_kind(&config.kind, clock, config.min, config.max, seed)
            .map_err(building.fail(Stage::Source, name))?;
        if let Some(name) = name {
            self.source_instances.insert(name.to_owned(), Arc::clone(&source));
        }
        self.sources.push(Arc::clone(&source));

        tracing::debug!(
            name = name.unwrap_or(INLINE),
            kind = %config.kind,
            clock = config.clock_ref.as_deref().unwrap_or(INLINE),
            min = ?config.min,
            max = ?config.max,
            "created source"
        );
        Ok(source)
    }

    // Values are never shared: every metric gets its own, even over a named source.
    fn create_value(
        &mut self,
        building: &Building<'_>,
        config: &ValueConfig,
        source: Arc<Source>,
    ) -> Result<Arc<Value>> {
        let fail = || building.fail(Stage::Value, None);
        let transforms = config
            .transforms
            .iter()
            .map(|t| Transform::parse(&t.kind))
            .collect::<obsbox_sim::Result<Vec<_>>>()
            .map_err(fail())?;
        let reset = config
            .reset
            .as_ref()
            .map(|r| Reset::parse(&r.kind, r.value))
            .transpose()
            .map_err(fail())?
            .unwrap_or_default();

        let value = Value::new(source, transforms, reset);
        self.values.push(Arc::clone(&value));

        tracing::debug!(
            source = config.source_ref.as_deref().unwrap_or(INLINE),
            transforms = config.transforms.len(),
            reset = ?reset,
            "created value"
        );
        Ok(value)
    }

    /// Start every unique clock. Must be called inside a tokio runtime.
    pub fn start(&self) -> Result<()> {
        tracing::info!(
            clocks = self.clocks.len(),
            sources = self.sources.len(),
            values = self.values.len(),
            metrics = self.metric_values.len(),
            "starting generator"
        );
        for clock in &self.clocks {
            clock.start().map_err(GeneratorError::Start)?;
        }
        Ok(())
    }

    /// Stop every unique clock and value. Safe after a partial or failed start.
    pub fn stop(&self) {
        for clock in &self.clocks {
            clock.stop();
        }
        for value in &self.values {
            value.stop();
        }
        tracing::info!("generator stopped");
    }

    /// Value bound to the metric at `index`.
    #[must_use]
    pub fn get_value(&self, index: usize) -> Option<&Arc<Value>> {
        self.metric_values.get(index)
    }

    /// Clock built for a named clock instance, if any metric used it.
    #[must_use]
    pub fn clock_instance(&self, name: &str) -> Option<&Arc<Clock>> {
        self.clock_instances.get(name)
    }

    /// Source built for a named source instance, if any metric used it.
    #[must_use]
    pub fn source_instance(&self, name: &str) -> Option<&Arc<Source>> {
        self.source_instances.get(name)
    }

    /// Number of unique clocks.
    #[must_use]
    pub fn clock_count(&self) -> usize {
        self.clocks.len()
    }

    /// Number of unique sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of values.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of metrics with a bound value.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metric_values.len()
    }
}
