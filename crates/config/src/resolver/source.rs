use super::{Resolver, label};
use crate::error::{EntityKind, NamespaceKind, ResolveErrorKind, Result, Role};
use crate::model::{ClockConfig, SourceConfig};
use crate::raw::{Named, RawSourceRef};

/// A source whose clock may still be missing.
///
/// Source templates may leave the clock for the referencing site to fill in;
/// everything that reaches a value or an instance must have one.
#[derive(Debug, Clone)]
pub(crate) struct SourceDraft {
    kind: String,
    clock: Option<(ClockConfig, Option<String>)>,
    min: Option<i64>,
    max: Option<i64>,
}

impl SourceDraft {
    fn finish(self) -> std::result::Result<SourceConfig, ResolveErrorKind> {
        let (clock, clock_ref) = self.clock.ok_or(ResolveErrorKind::ClockRequiredInSource)?;
        Ok(SourceConfig {
            kind: self.kind,
            clock,
            clock_ref,
            min: self.min,
            max: self.max,
        })
    }
}

impl Resolver {
    pub(super) fn resolve_template_sources(
        &mut self,
        defs: Vec<Named<RawSourceRef>>,
    ) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving template sources");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::template(EntityKind::Source))?;
            let draft = self.scoped(label(EntityKind::Source, Role::Template), &name, |r| {
                let draft = r.define_source(&definition)?;
                r.check_source_kind(&draft)?;
                Ok(draft)
            })?;
            tracing::debug!(name = %name, kind = %draft.kind, "template source");
            self.source_templates.insert(name, draft);
        }
        Ok(())
    }

    pub(super) fn resolve_instance_sources(
        &mut self,
        defs: Vec<Named<RawSourceRef>>,
    ) -> Result<()> {
        tracing::debug!(count = defs.len(), "resolving instance sources");
        for Named { name, definition } in defs {
            self.namespace
                .register(&name, NamespaceKind::instance(EntityKind::Source))?;
            let source = self.scoped(label(EntityKind::Source, Role::Instance), &name, |r| {
                let draft = r.define_source(&definition)?;
                r.check_source_kind(&draft)?;
                r.finish_source(draft)
            })?;
            tracing::debug!(
                name = %name,
                kind = %source.kind,
                clock = source.clock_ref.as_deref().unwrap_or("inline"),
                "instance source"
            );
            self.instances.sources.insert(name, source);
        }
        Ok(())
    }

    /// A source reference; the name is set only for instance references.
    pub(super) fn resolve_source_ref(
        &mut self,
        raw: &RawSourceRef,
    ) -> Result<(SourceConfig, Option<String>)> {
        if let Some(name) = &raw.instance {
            if raw.template.is_some() || raw.has_overrides() {
                return self.fail(ResolveErrorKind::CannotOverrideInstance(EntityKind::Source));
            }
            return match self.instances.sources.get(name) {
                Some(source) => Ok((source.clone(), Some(name.clone()))),
                None => self.fail(ResolveErrorKind::InstanceNotFound {
                    kind: EntityKind::Source,
                    name: name.clone(),
                }),
            };
        }

        let draft = match &raw.template {
            Some(_) => self.define_source(raw)?,
            None if raw.has_overrides() => {
                let draft = self.define_source(raw)?;
                self.check_source_kind(&draft)?;
                draft
            }
            None => return self.fail(ResolveErrorKind::MissingDefinition(EntityKind::Source)),
        };
        Ok((self.finish_source(draft)?, None))
    }

    /// A source from a template plus overrides, or from inline fields.
    ///
    /// The type of a template-derived source is not re-checked here; an
    /// emptied type surfaces when the owning metric is validated.
    fn define_source(&mut self, raw: &RawSourceRef) -> Result<SourceDraft> {
        if raw.instance.is_some() {
            return self.fail(ResolveErrorKind::DefinitionAliasesInstance(EntityKind::Source));
        }

        let Some(template) = &raw.template else {
            let clock = match &raw.clock {
                Some(clock) => Some(self.resolve_clock_ref(clock)?),
                None => None,
            };
            return Ok(SourceDraft {
                kind: raw.kind.clone().unwrap_or_default(),
                clock,
                min: raw.min,
                max: raw.max,
            });
        };

        let Some(base) = self.source_templates.get(template).cloned() else {
            return self.fail(ResolveErrorKind::TemplateNotFound {
                kind: EntityKind::Source,
                name: template.clone(),
            });
        };
        self.scoped(label(EntityKind::Source, Role::Template), template, |r| {
            let mut draft = base;
            if let Some(kind) = &raw.kind {
                draft.kind.clone_from(kind);
            }
            if let Some(clock) = &raw.clock {
                draft.clock = Some(r.resolve_clock_ref(clock)?);
            }
            if raw.min.is_some() {
                draft.min = raw.min;
            }
            if raw.max.is_some() {
                draft.max = raw.max;
            }
            Ok(draft)
        })
    }

    fn check_source_kind(&self, draft: &SourceDraft) -> Result<()> {
        if draft.kind.is_empty() {
            return self.fail(ResolveErrorKind::Required("source type"));
        }
        Ok(())
    }

    fn finish_source(&self, draft: SourceDraft) -> Result<SourceConfig> {
        draft.finish().or_else(|kind| self.fail(kind))
    }
}
