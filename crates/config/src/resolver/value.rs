use super::{Resolver, label};
use crate::error::{EntityKind, NamespaceKind, ResolveErrorKind, Result, Role};
use crate::model::ValueConfig;
use crate::raw::{Named, RawValueRef};

impl Resolver {
    pub(super) fn resolve_template_values(&mut self, defs: Vec<Named<RawValueRef>>) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving template values");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::template(EntityKind::Value))?;
            let value = self.scoped(label(EntityKind::Value, Role::Template), &name, |r| {
                r.define_value(&definition)
            })?;
            tracing::debug!(name = %name, source = %value.source.kind, "template value");
            self.value_templates.insert(name, value);
        }
        Ok(())
    }

    pub(super) fn resolve_instance_values(&mut self, defs: Vec<Named<RawValueRef>>) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving instance values");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::instance(EntityKind::Value))?;
            let value = self.scoped(label(EntityKind::Value, Role::Instance), &name, |r| {
                r.define_value(&definition)
            })?;
            tracing::debug!(name = %name, source = %value.source.kind, "instance value");
            self.instances.values.insert(name, value);
        }
        Ok(())
    }

    /// A value reference. Value instances are returned verbatim, including
    /// the source instance name they recorded.
    pub(super) fn resolve_value_ref(&mut self, raw: &RawValueRef) -> Result<ValueConfig> {
        if let Some(name) = &raw.instance {
            if raw.template.is_some() || raw.has_overrides() {
                return self.fail(ResolveErrorKind::CannotOverrideInstance(EntityKind::Value));
            }
            return match self.instances.values.get(name) {
                Some(value) => Ok(value.clone()),
                None => self.fail(ResolveErrorKind::InstanceNotFound {
                    kind: EntityKind::Value,
                    name: name.clone(),
                }),
            };
        }
        if raw.template.is_none() && !raw.has_overrides() {
            return self.fail(ResolveErrorKind::MissingDefinition(EntityKind::Value));
        }
        self.build_value(raw)
    }

    /// A fully checked value definition.
    fn define_value(&mut self, raw: &RawValueRef) -> Result<ValueConfig> {
        if raw.instance.is_some() {
            return self.fail(ResolveErrorKind::DefinitionAliasesInstance(EntityKind::Value));
        }
        let value = self.build_value(raw)?;
        if value.source.kind.is_empty() {
            return self.fail(ResolveErrorKind::Required("source"));
        }
        if value.source.clock.kind.is_empty() {
            return self.fail(ResolveErrorKind::ClockRequiredInSource);
        }
        Ok(value)
    }

    /// Template plus overrides, or inline fields. Lists are replaced, never merged.
    fn build_value(&mut self, raw: &RawValueRef) -> Result<ValueConfig> {
        let Some(template) = &raw.template else {
            let Some(source) = &raw.source else {
                return self.fail(ResolveErrorKind::Required("source"));
            };
            let (source, source_ref) = self.resolve_source_ref(source)?;
            return Ok(ValueConfig {
                source,
                source_ref,
                transforms: raw.transforms.clone().unwrap_or_default(),
                reset: raw.reset.clone(),
            });
        };

        let Some(base) = self.value_templates.get(template).cloned() else {
            return self.fail(ResolveErrorKind::TemplateNotFound {
                kind: EntityKind::Value,
                name: template.clone(),
            });
        };
        self.scoped(label(EntityKind::Value, Role::Template), template, |r| {
            let mut value = base;
            if let Some(source) = &raw.source {
                let (source, source_ref) = r.resolve_source_ref(source)?;
                value.source = source;
                value.source_ref = source_ref;
            }
            if let Some(transforms) = &raw.transforms {
                value.transforms.clone_from(transforms);
            }
            if raw.reset.is_some() {
                value.reset.clone_from(&raw.reset);
            }
            Ok(value)
        })
    }
}
