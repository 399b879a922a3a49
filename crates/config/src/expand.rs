//! Placeholder expansion of parametrized entries.

use crate::error::{ConfigError, EntityKind, IteratorError, Result};
use crate::iterator::{CombinationGenerator, IteratorRegistry};
use crate::placeholder::Placeholders;
use crate::raw::RawConfig;

/// Maximum number of copies a single entry may expand into.
pub const MAX_COMBINATIONS: usize = 100_000;

/// Expand every entry of `items` over the iterators it references.
///
/// Entries without placeholders are kept as they are. An entry whose
/// iterators multiply out to zero combinations, or to more than
/// [`MAX_COMBINATIONS`], is an error. Output order is
/// declaration order, with each entry's copies in combination order.
pub fn expand_entries<T: Placeholders>(
    items: Vec<T>,
    registry: &IteratorRegistry,
    section: &'static str,
    entity: EntityKind,
) -> Result<Vec<T>> {
    let fail = |index: usize, source: IteratorError| ConfigError::Expansion {
        section,
        entity,
        index,
        source,
    };

    let mut expanded = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let names = item.find_placeholders();
        if names.is_empty() {
            expanded.push(item);
            continue;
        }

        let iterators = registry
            .get_iterators(names.iter().map(String::as_str))
            .map_err(|e| fail(index, e))?;
        let generator = CombinationGenerator::new(iterators).map_err(|e| fail(index, e))?;
        if generator.total() == 0 {
            return Err(fail(index, IteratorError::ZeroCombinations));
        }
        if generator.total() > MAX_COMBINATIONS {
            return Err(fail(
                index,
                IteratorError::TooManyCombinations {
                    total: generator.total(),
                    limit: MAX_COMBINATIONS,
                },
            ));
        }

        generator.for_each(|combination| {
            expanded.push(item.substituted(&combination));
            Ok::<_, ConfigError>(())
        })?;
        tracing::debug!(section, index, count = generator.total(), "expanded entry");
    }
    Ok(expanded)
}

impl RawConfig {
    /// Expand placeholders in every section and clear the iterator list.
    ///
    /// With no iterators defined this is a no-op and braces stay literal.
    /// Calling it a second time does nothing.
    pub fn expand(&mut self) -> Result<()> {
        let definitions = std::mem::take(&mut self.iterators);
        if definitions.is_empty() {
            return Ok(());
        }
        let registry =
            IteratorRegistry::from_definitions(&definitions).map_err(ConfigError::Iterators)?;
        tracing::debug!(count = registry.len(), "iterator registry built");

        let templates = &mut self.templates;
        templates.clocks = expand_entries(
            std::mem::take(&mut templates.clocks),
            &registry,
            "template clocks",
            EntityKind::Clock,
        )?;
        templates.sources = expand_entries(
            std::mem::take(&mut templates.sources),
            &registry,
            "template sources",
            EntityKind::Source,
        )?;
        templates.values = expand_entries(
            std::mem::take(&mut templates.values),
            &registry,
            "template values",
            EntityKind::Value,
        )?;
        templates.metrics = expand_entries(
            std::mem::take(&mut templates.metrics),
            &registry,
            "template metrics",
            EntityKind::Metric,
        )?;

        let instances = &mut self.instances;
        instances.clocks = expand_entries(
            std::mem::take(&mut instances.clocks),
            &registry,
            "instance clocks",
            EntityKind::Clock,
        )?;
        instances.sources = expand_entries(
            std::mem::take(&mut instances.sources),
            &registry,
            "instance sources",
            EntityKind::Source,
        )?;
        instances.values = expand_entries(
            std::mem::take(&mut instances.values),
            &registry,
            "instance values",
            EntityKind::Value,
        )?;

        self.metrics = expand_entries(
            std::mem::take(&mut self.metrics),
            &registry,
            "metrics",
            EntityKind::Metric,
        )?;
        Ok(())
    }
}
