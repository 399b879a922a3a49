//! General settings.

use std::fmt;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::raw::RawSettings;

/// Naming convention for self-monitoring metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingFormat {
    /// Each exporter's own convention.
    #[default]
    Native,
    /// `obsbox_values_total`.
    Underscore,
    /// `obsbox.values.total`.
    Dot,
}

impl fmt::Display for NamingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::Underscore => "underscore",
            Self::Dot => "dot",
        })
    }
}

/// Self-monitoring metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InternalMetrics {
    /// Whether they are exposed.
    pub enabled: bool,
    /// Naming convention.
    pub format: NamingFormat,
}

/// Resolved general settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Seed for deterministic random sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Self-monitoring metrics.
    pub internal_metrics: InternalMetrics,
}

impl Settings {
    /// Apply defaults and validate.
    pub fn resolve(raw: &RawSettings) -> Result<Self> {
        let format = match raw.internal_metrics.format.as_deref() {
            None | Some("" | "native") => NamingFormat::Native,
            Some("underscore") => NamingFormat::Underscore,
            Some("dot") => NamingFormat::Dot,
            Some(other) => {
                return Err(ConfigError::Settings(format!(
                    "invalid naming format: {other} (must be native, underscore, or dot)"
                )));
            }
        };
        Ok(Self {
            seed: raw.seed,
            internal_metrics: InternalMetrics {
                enabled: raw.internal_metrics.enabled,
                format,
            },
        })
    }
}
