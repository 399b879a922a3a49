//! Configuration error types.
//!
//! Every failure is fail-fast: loading stops at the first error and reports
//! it as a single [`ConfigError`]. Resolution failures additionally carry the
//! chain of entities that was being resolved (see [`ResolveError`]).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The four kinds of entity that live in the shared namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A clock driving sources.
    Clock,
    /// A source producing observations.
    Source,
    /// A value shaping a source's observations.
    Value,
    /// A metric exposed to exporters.
    Metric,
}

impl EntityKind {
    /// Lowercase name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Source => "source",
            Self::Value => "value",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a named entity is a template or an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Reusable definition, discarded after resolution.
    Template,
    /// Shared definition, retained and shared at runtime.
    Instance,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Template => "template",
            Self::Instance => "instance",
        })
    }
}

/// A slot in the global namespace, e.g. "template clock".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceKind {
    /// Template or instance.
    pub role: Role,
    /// Entity kind.
    pub entity: EntityKind,
}

impl NamespaceKind {
    /// Template of the given kind.
    #[must_use]
    pub const fn template(entity: EntityKind) -> Self {
        Self {
            role: Role::Template,
            entity,
        }
    }

    /// Instance of the given kind.
    #[must_use]
    pub const fn instance(entity: EntityKind) -> Self {
        Self {
            role: Role::Instance,
            entity,
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.entity)
    }
}

/// Errors from iterator definitions and placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IteratorError {
    /// Two iterators share a name.
    #[error("iterator \"{0}\" already registered")]
    Duplicate(String),

    /// A placeholder names an iterator that was never defined.
    #[error("iterator \"{0}\" not defined")]
    Undefined(String),

    /// A range iterator is missing `start` or `end`.
    #[error("iterator \"{name}\": {field} required for range type")]
    MissingBound {
        /// Iterator name.
        name: String,
        /// `start` or `end`.
        field: &'static str,
    },

    /// A list iterator has no values.
    #[error("iterator \"{0}\": values required for list type")]
    MissingValues(String),

    /// The iterator type is neither `range` nor `list`.
    #[error("iterator \"{name}\": unknown type \"{kind}\" (must be range or list)")]
    UnknownType {
        /// Iterator name.
        name: String,
        /// The type that was given.
        kind: String,
    },

    /// A parametrized entity expands to nothing.
    #[error("iterator combination produces zero results")]
    ZeroCombinations,

    /// The Cartesian product does not fit in `usize`.
    #[error("iterator combination count overflows")]
    CombinationOverflow,

    /// One entry would expand into more copies than allowed.
    #[error("iterator combination produces {total} results (limit {limit})")]
    TooManyCombinations {
        /// Combinations the entry would produce.
        total: usize,
        /// Maximum allowed per entry.
        limit: usize,
    },
}

/// What went wrong while resolving a single reference or definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveErrorKind {
    /// `instance: X` names an unknown instance.
    #[error("{kind} instance \"{name}\" not found")]
    InstanceNotFound {
        /// Kind of the reference.
        kind: EntityKind,
        /// The missing name.
        name: String,
    },

    /// `template: X` names an unknown template.
    #[error("{kind} template \"{name}\" not found")]
    TemplateNotFound {
        /// Kind of the reference.
        kind: EntityKind,
        /// The missing name.
        name: String,
    },

    /// An instance reference also carries override fields.
    #[error("cannot override instance {0}")]
    CannotOverrideInstance(EntityKind),

    /// Neither instance, template nor inline fields were given.
    #[error("{0} must reference instance, template, or provide inline definition")]
    MissingDefinition(EntityKind),

    /// A template or instance definition tries to alias an instance.
    #[error("{0} definition cannot reference an instance")]
    DefinitionAliasesInstance(EntityKind),

    /// A mandatory field is empty or absent.
    #[error("{0} required")]
    Required(&'static str),

    /// A value's source has no clock.
    #[error("clock required in source")]
    ClockRequiredInSource,

    /// Metric type is neither counter nor gauge.
    #[error("invalid type: {0} (must be counter or gauge)")]
    InvalidMetricType(String),

    /// Attribute key does not follow label naming rules.
    #[error("invalid attribute name \"{0}\"")]
    InvalidAttributeName(String),
}

/// A resolution failure together with the chain of entities being resolved.
///
/// Frames are stored outermost first and displayed deepest first, one
/// `in <kind> "<name>"` line each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    kind: ResolveErrorKind,
    frames: Vec<String>,
}

impl ResolveError {
    pub(crate) fn new(kind: ResolveErrorKind, frames: Vec<String>) -> Self {
        Self { kind, frames }
    }

    /// The underlying failure.
    #[must_use]
    pub fn kind(&self) -> &ResolveErrorKind {
        &self.kind
    }

    /// Context frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for frame in self.frames.iter().rev() {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveError {}

/// Errors that can occur while loading, expanding, or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the raw schema.
    #[error("failed to parse YAML")]
    Parse(#[from] serde_yaml::Error),

    /// Structural check on the raw configuration failed.
    #[error("{0}")]
    Syntax(String),

    /// A name is reused across the shared namespace.
    #[error("name \"{name}\" already used by {existing}, cannot reuse for {requested}")]
    NameCollision {
        /// The contested name.
        name: String,
        /// Who registered it first.
        existing: NamespaceKind,
        /// Who tried to register it again.
        requested: NamespaceKind,
    },

    /// An iterator definition is invalid.
    #[error("failed to build iterator registry")]
    Iterators(#[source] IteratorError),

    /// Placeholder expansion of one entity failed.
    #[error("failed to expand {section}: {entity} at index {index}")]
    Expansion {
        /// Section being expanded, e.g. "template clocks".
        section: &'static str,
        /// Kind of the failing entity.
        entity: EntityKind,
        /// Position of the entity within its section.
        index: usize,
        /// What went wrong.
        #[source]
        source: IteratorError,
    },

    /// Template/instance/metric resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Export section failed validation.
    #[error("invalid export configuration: {0}")]
    Export(String),

    /// Settings section failed validation.
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl ConfigError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    /// The resolution failure, if this is one.
    #[must_use]
    pub fn as_resolve(&self) -> Option<&ResolveError> {
        match self {
            Self::Resolve(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolve_error_prints_deepest_frame_first() {
        let err = ResolveError::new(
            ResolveErrorKind::Required("clock interval"),
            vec![
                "metric \"requests_total\"".into(),
                "value template \"counter\"".into(),
                "source template \"random\"".into(),
            ],
        );
        assert_eq!(
            err.to_string(),
            "clock interval required\n  in source template \"random\"\n  in value template \"counter\"\n  in metric \"requests_total\""
        );
    }

    #[test]
    fn name_collision_names_both_kinds() {
        let err = ConfigError::NameCollision {
            name: "fast".into(),
            existing: NamespaceKind::template(EntityKind::Clock),
            requested: NamespaceKind::instance(EntityKind::Source),
        };
        assert_eq!(
            err.to_string(),
            "name \"fast\" already used by template clock, cannot reuse for instance source"
        );
    }

    #[test]
    fn expansion_error_keeps_reason_as_source() {
        let err = ConfigError::Expansion {
            section: "metrics",
            entity: EntityKind::Metric,
            index: 2,
            source: IteratorError::ZeroCombinations,
        };
        assert_eq!(err.to_string(), "failed to expand metrics: metric at index 2");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("iterator combination produces zero results")
        );
    }
}
