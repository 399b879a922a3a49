//! Loading entry points: YAML text or file to raw or resolved configuration.

use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::model::Config;
use crate::raw::RawConfig;
use crate::resolver::resolve;

/// Parse YAML text and run the structural checks.
pub fn parse_str(yaml: &str) -> Result<RawConfig> {
    let raw: RawConfig = serde_yaml::from_str(yaml)?;
    raw.validate_syntax()?;
    Ok(raw)
}

/// Read and parse a configuration file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read config file");
    parse_str(&text)
}

/// Parse and resolve YAML text.
pub fn load_str(yaml: &str) -> Result<Config> {
    resolve(parse_str(yaml)?)
}

/// Parse and resolve a configuration file.
pub fn load(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config = resolve(parse_file(path)?)?;
    tracing::info!(
        path = %path.display(),
        metrics = config.metrics.len(),
        instances = config.instances.len(),
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r"
metrics:
  - name: ticks_total
    type: counter
    description: Ticks
    value:
      source:
        type: random_int
        clock: {type: periodic, interval: 1s}
";

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = load(file.path()).unwrap();
        assert_eq!(config.metrics.len(), 1);
        assert_eq!(config.metrics[0].prometheus_name, "ticks_total");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = parse_str("metrics: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn syntax_checks_run_on_parse() {
        let err = parse_str("metrics: []").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }
}
