//! Structural checks on the raw configuration, run before resolution.

use crate::error::{ConfigError, Result};
use crate::raw::RawConfig;

impl RawConfig {
    /// Check that metrics exist and carry a name, type and description.
    ///
    /// No template or instance semantics are involved; a metric whose type
    /// is misspelled passes here and fails during resolution.
    pub fn validate_syntax(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(ConfigError::syntax("at least one metric must be defined"));
        }

        for (index, metric) in self.metrics.iter().enumerate() {
            let name = metric.name.display_name();
            if name.is_empty() {
                return Err(ConfigError::syntax(format!(
                    "metric at index {index}: name cannot be empty"
                )));
            }
            if metric.kind.is_empty() {
                return Err(ConfigError::syntax(format!(
                    "metric \"{name}\": type cannot be empty"
                )));
            }
            if metric.description.is_empty() {
                return Err(ConfigError::syntax(format!(
                    "metric \"{name}\": description cannot be empty"
                )));
            }
        }
        Ok(())
    }
}
