use std::time::Duration;

use super::{Resolver, label};
use crate::error::{EntityKind, NamespaceKind, ResolveErrorKind, Result, Role};
use crate::model::ClockConfig;
use crate::raw::{Named, RawClockRef};

impl Resolver {
    pub(super) fn resolve_template_clocks(&mut self, defs: Vec<Named<RawClockRef>>) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving template clocks");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::template(EntityKind::Clock))?;
            let clock = self.scoped(label(EntityKind::Clock, Role::Template), &name, |r| {
                r.define_clock(&definition)
            })?;
            tracing::debug!(name = %name, kind = %clock.kind, interval = ?clock.interval, "template clock");
            self.clock_templates.insert(name, clock);
        }
        Ok(())
    }

    pub(super) fn resolve_instance_clocks(&mut self, defs: Vec<Named<RawClockRef>>) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving instance clocks");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::instance(EntityKind::Clock))?;
            let clock = self.scoped(label(EntityKind::Clock, Role::Instance), &name, |r| {
                r.define_clock(&definition)
            })?;
            tracing::debug!(name = %name, kind = %clock.kind, interval = ?clock.interval, "instance clock");
            self.instances.clocks.insert(name, clock);
        }
        Ok(())
    }

    /// A clock reference; the name is set only for instance references.
    pub(super) fn resolve_clock_ref(
        &mut self,
        raw: &RawClockRef,
    ) -> Result<(ClockConfig, Option<String>)> {
        if let Some(name) = &raw.instance {
            if raw.template.is_some() || raw.has_overrides() {
                return self.fail(ResolveErrorKind::CannotOverrideInstance(EntityKind::Clock));
            }
            return match self.instances.clocks.get(name) {
                Some(clock) => Ok((clock.clone(), Some(name.clone()))),
                None => self.fail(ResolveErrorKind::InstanceNotFound {
                    kind: EntityKind::Clock,
                    name: name.clone(),
                }),
            };
        }
        if raw.template.is_none() && !raw.has_overrides() {
            return self.fail(ResolveErrorKind::MissingDefinition(EntityKind::Clock));
        }
        Ok((self.define_clock(raw)?, None))
    }

    /// A clock from a template plus overrides, or from inline fields.
    fn define_clock(&mut self, raw: &RawClockRef) -> Result<ClockConfig> {
        if raw.instance.is_some() {
            return self.fail(ResolveErrorKind::DefinitionAliasesInstance(EntityKind::Clock));
        }

        let Some(template) = &raw.template else {
            let clock = ClockConfig {
                kind: raw.kind.clone().unwrap_or_default(),
                interval: raw.interval.unwrap_or(Duration::ZERO),
            };
            self.check_clock(&clock)?;
            return Ok(clock);
        };

        let Some(base) = self.clock_templates.get(template).cloned() else {
            return self.fail(ResolveErrorKind::TemplateNotFound {
                kind: EntityKind::Clock,
                name: template.clone(),
            });
        };
        self.scoped(label(EntityKind::Clock, Role::Template), template, |r| {
            let mut clock = base;
            if let Some(kind) = &raw.kind {
                clock.kind.clone_from(kind);
            }
            if let Some(interval) = raw.interval {
                clock.interval = interval;
            }
            r.check_clock(&clock)?;
            Ok(clock)
        })
    }

    fn check_clock(&self, clock: &ClockConfig) -> Result<()> {
        if clock.kind.is_empty() {
            return self.fail(ResolveErrorKind::Required("clock type"));
        }
        if clock.interval.is_zero() {
            return self.fail(ResolveErrorKind::Required("clock interval"));
        }
        Ok(())
    }
}
