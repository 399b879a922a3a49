//! Generator error types.

use obsbox_sim::SimError;

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Which runtime object was being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Clock construction.
    Clock,
    /// Source construction.
    Source,
    /// Value construction.
    Value,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Clock => "clock",
            Self::Source => "source",
            Self::Value => "value",
        })
    }
}

/// Errors from building the runtime graph or its descriptors.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// A simulation primitive rejected its configuration.
    #[error("metric {index} ({metric}): failed to create {stage}{}", instance_suffix(.instance))]
    Build {
        /// Index of the metric being built.
        index: usize,
        /// Prometheus name of the metric.
        metric: String,
        /// Object being built.
        stage: Stage,
        /// Instance name, when the object is a named instance.
        instance: Option<String>,
        /// Underlying failure.
        #[source]
        source: SimError,
    },

    /// No runtime value is bound to a metric index.
    #[error("value not found for metric {index} ({metric})")]
    ValueNotFound {
        /// Index of the metric.
        index: usize,
        /// Prometheus name of the metric.
        metric: String,
    },

    /// A clock failed to start.
    #[error("failed to start clock")]
    Start(#[source] SimError),
}

#[allow(clippy::ref_option)]
fn instance_suffix(instance: &Option<String>) -> String {
    instance
        .as_deref()
        .map_or_else(String::new, |name| format!(" instance \"{name}\""))
}
