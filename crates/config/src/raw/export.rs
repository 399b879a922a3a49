//! As-authored `export` and `settings` sections.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// `export:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawExport {
    /// Prometheus pull endpoint.
    #[serde(default)]
    pub prometheus: Option<RawPrometheusExport>,
    /// OpenTelemetry push exporter.
    #[serde(default)]
    pub otel: Option<RawOtelExport>,
}

/// `export.prometheus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPrometheusExport {
    /// Whether the endpoint is served.
    #[serde(default)]
    pub enabled: bool,
    /// Listen port.
    #[serde(default)]
    pub port: Option<i64>,
    /// HTTP path.
    #[serde(default)]
    pub path: Option<String>,
}

/// `export.otel`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOtelExport {
    /// Whether metrics are pushed.
    #[serde(default)]
    pub enabled: bool,
    /// `grpc` or `http`.
    #[serde(default)]
    pub transport: Option<String>,
    /// Collector host.
    #[serde(default)]
    pub host: Option<String>,
    /// Collector port.
    #[serde(default)]
    pub port: Option<i64>,
    /// Read and push intervals.
    #[serde(default)]
    pub interval: Option<RawInterval>,
    /// Resource attributes.
    #[serde(default)]
    pub resource: BTreeMap<String, String>,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// OTLP interval: one duration for both, or `{read, push}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawInterval {
    /// Same interval for reading and pushing.
    Uniform(#[serde(with = "humantime_serde")] Duration),
    /// Separate intervals.
    Split {
        /// How often values are read.
        #[serde(default, with = "humantime_serde")]
        read: Option<Duration>,
        /// How often batches are pushed.
        #[serde(default, with = "humantime_serde")]
        push: Option<Duration>,
    },
}

/// `settings:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    /// Seed for deterministic random sources.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Self-monitoring metrics.
    #[serde(default)]
    pub internal_metrics: RawInternalMetrics,
}

/// `settings.internal_metrics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInternalMetrics {
    /// Whether internal metrics are exposed.
    #[serde(default)]
    pub enabled: bool,
    /// `native`, `underscore` or `dot`.
    #[serde(default)]
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interval_accepts_single_duration() {
        let otel: RawOtelExport = serde_yaml::from_str("enabled: true\ninterval: 10s").unwrap();
        assert_eq!(
            otel.interval,
            Some(RawInterval::Uniform(Duration::from_secs(10)))
        );
    }

    #[test]
    fn interval_accepts_read_and_push() {
        let otel: RawOtelExport =
            serde_yaml::from_str("enabled: true\ninterval:\n  read: 500ms\n  push: 5s").unwrap();
        assert_eq!(
            otel.interval,
            Some(RawInterval::Split {
                read: Some(Duration::from_millis(500)),
                push: Some(Duration::from_secs(5)),
            })
        );
    }
}
