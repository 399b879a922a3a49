//! Exporter settings: defaults and validation.
//!
//! The exporters themselves live outside this crate; this module only makes
//! sure they receive a complete, plausible configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::raw::{RawExport, RawInterval, RawOtelExport, RawPrometheusExport};

/// Default Prometheus listen port.
pub const DEFAULT_PROMETHEUS_PORT: u16 = 9090;
/// Default Prometheus path.
pub const DEFAULT_PROMETHEUS_PATH: &str = "/metrics";
/// Default OTLP collector host.
pub const DEFAULT_OTEL_HOST: &str = "localhost";
/// Default OTLP/gRPC port.
pub const DEFAULT_OTEL_GRPC_PORT: u16 = 4317;
/// Default OTLP/HTTP port.
pub const DEFAULT_OTEL_HTTP_PORT: u16 = 4318;
/// Default OTLP read and push interval.
pub const DEFAULT_OTEL_INTERVAL: Duration = Duration::from_secs(1);
/// Default `service.name` resource attribute.
pub const DEFAULT_SERVICE_NAME: &str = "obsbox";

/// Resolved exporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportConfig {
    /// Prometheus endpoint, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<PrometheusExport>,
    /// OpenTelemetry exporter, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<OtelExport>,
}

/// Prometheus pull endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrometheusExport {
    /// Whether the endpoint is served.
    pub enabled: bool,
    /// Listen port.
    pub port: u16,
    /// HTTP path.
    pub path: String,
}

impl Default for PrometheusExport {
    fn default() -> Self {
        Self {
            enabled: true,
            port: DEFAULT_PROMETHEUS_PORT,
            path: DEFAULT_PROMETHEUS_PATH.to_owned(),
        }
    }
}

/// OTLP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtelTransport {
    /// OTLP over gRPC.
    Grpc,
    /// OTLP over HTTP.
    Http,
}

impl OtelTransport {
    /// Conventional collector port for the transport.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Grpc => DEFAULT_OTEL_GRPC_PORT,
            Self::Http => DEFAULT_OTEL_HTTP_PORT,
        }
    }
}

impl fmt::Display for OtelTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grpc => "grpc",
            Self::Http => "http",
        })
    }
}

/// OTLP read/push cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OtelInterval {
    /// How often values are read.
    #[serde(with = "humantime_serde")]
    pub read: Duration,
    /// How often batches are pushed.
    #[serde(with = "humantime_serde")]
    pub push: Duration,
}

/// OpenTelemetry push exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtelExport {
    /// Whether metrics are pushed.
    pub enabled: bool,
    /// Transport protocol.
    pub transport: OtelTransport,
    /// Collector host.
    pub host: String,
    /// Collector port.
    pub port: u16,
    /// Read/push cadence.
    pub interval: OtelInterval,
    /// Resource attributes.
    pub resource: BTreeMap<String, String>,
    /// Extra request headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl ExportConfig {
    /// Apply defaults and validate.
    ///
    /// Without any exporter section Prometheus is enabled with defaults.
    /// Exactly one exporter must end up enabled: two readers would race on
    /// reset-on-read values.
    pub fn resolve(raw: &RawExport) -> Result<Self> {
        if raw.prometheus.is_none() && raw.otel.is_none() {
            return Ok(Self {
                prometheus: Some(PrometheusExport::default()),
                otel: None,
            });
        }

        let prometheus = raw.prometheus.as_ref().map(resolve_prometheus).transpose()?;
        let otel = raw.otel.as_ref().map(resolve_otel).transpose()?;

        let prometheus_enabled = prometheus.as_ref().is_some_and(|p| p.enabled);
        let otel_enabled = otel.as_ref().is_some_and(|o| o.enabled);
        match (prometheus_enabled, otel_enabled) {
            (false, false) => Err(ConfigError::Export(
                "at least one exporter must be enabled".into(),
            )),
            (true, true) => Err(ConfigError::Export(
                "only one exporter can be enabled at a time (prometheus or otel)".into(),
            )),
            _ => Ok(Self { prometheus, otel }),
        }
    }

    /// Whether the Prometheus endpoint is enabled.
    #[must_use]
    pub fn prometheus_enabled(&self) -> bool {
        self.prometheus.as_ref().is_some_and(|p| p.enabled)
    }

    /// Whether the OTLP exporter is enabled.
    #[must_use]
    pub fn otel_enabled(&self) -> bool {
        self.otel.as_ref().is_some_and(|o| o.enabled)
    }
}

fn port(kind: &str, value: Option<i64>, default: u16) -> Result<u16> {
    match value {
        None | Some(0) => Ok(default),
        Some(p) => u16::try_from(p)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| ConfigError::Export(format!("invalid {kind} port: {p}"))),
    }
}

fn resolve_prometheus(raw: &RawPrometheusExport) -> Result<PrometheusExport> {
    Ok(PrometheusExport {
        enabled: raw.enabled,
        port: port("prometheus", raw.port, DEFAULT_PROMETHEUS_PORT)?,
        path: raw
            .path
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROMETHEUS_PATH.to_owned()),
    })
}

fn resolve_otel(raw: &RawOtelExport) -> Result<OtelExport> {
    let transport = match raw.transport.as_deref() {
        None | Some("" | "grpc") => OtelTransport::Grpc,
        Some("http") => OtelTransport::Http,
        Some(other) => {
            return Err(ConfigError::Export(format!(
                "invalid transport: {other} (must be grpc or http)"
            )));
        }
    };

    let interval = match raw.interval {
        None => OtelInterval {
            read: DEFAULT_OTEL_INTERVAL,
            push: DEFAULT_OTEL_INTERVAL,
        },
        Some(RawInterval::Uniform(every)) => OtelInterval {
            read: every,
            push: every,
        },
        Some(RawInterval::Split { read, push }) => OtelInterval {
            read: read.unwrap_or(DEFAULT_OTEL_INTERVAL),
            push: push.unwrap_or(DEFAULT_OTEL_INTERVAL),
        },
    };
    if interval.read.is_zero() || interval.push.is_zero() {
        return Err(ConfigError::Export("otel intervals must be positive".into()));
    }

    let mut resource = raw.resource.clone();
    resource
        .entry("service.name".into())
        .or_insert_with(|| DEFAULT_SERVICE_NAME.to_owned());
    resource
        .entry("service.version".into())
        .or_insert_with(|| env!("CARGO_PKG_VERSION").to_owned());

    Ok(OtelExport {
        enabled: raw.enabled,
        transport,
        host: raw
            .host
            .clone()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_OTEL_HOST.to_owned()),
        port: port("otel", raw.port, transport.default_port())?,
        interval,
        resource,
        headers: raw.headers.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> RawExport {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_section_enables_prometheus() {
        let export = ExportConfig::resolve(&RawExport::default()).unwrap();
        assert_eq!(export.prometheus, Some(PrometheusExport::default()));
        assert!(export.otel.is_none());
    }

    #[test]
    fn prometheus_defaults_fill_gaps() {
        let export = ExportConfig::resolve(&parse("prometheus: {enabled: true}")).unwrap();
        let prom = export.prometheus.unwrap();
        assert_eq!(prom.port, 9090);
        assert_eq!(prom.path, "/metrics");
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let err = ExportConfig::resolve(&parse("prometheus: {enabled: true, port: 70000}"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid export configuration: invalid prometheus port: 70000"
        );
    }

    #[test]
    fn http_transport_defaults_to_4318() {
        let export =
            ExportConfig::resolve(&parse("otel: {enabled: true, transport: http}")).unwrap();
        let otel = export.otel.unwrap();
        assert_eq!(otel.port, 4318);
        assert_eq!(otel.host, "localhost");
        assert_eq!(otel.interval.read, Duration::from_secs(1));
        assert_eq!(otel.resource.get("service.name").map(String::as_str), Some("obsbox"));
        assert!(otel.resource.contains_key("service.version"));
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let err = ExportConfig::resolve(&parse("otel: {enabled: true, transport: udp}"))
            .unwrap_err();
        assert!(err.to_string().contains("invalid transport: udp"));
    }

    #[test]
    fn user_resource_attributes_win() {
        let export = ExportConfig::resolve(&parse(
            "otel:\n  enabled: true\n  resource:\n    service.name: checkout",
        ))
        .unwrap();
        let otel = export.otel.unwrap();
        assert_eq!(otel.resource["service.name"], "checkout");
    }

    #[test]
    fn exactly_one_exporter_must_be_enabled() {
        let err = ExportConfig::resolve(&parse("prometheus: {enabled: false}")).unwrap_err();
        assert!(err.to_string().contains("at least one exporter"));

        let err = ExportConfig::resolve(&parse(
            "prometheus: {enabled: true}\notel: {enabled: true}",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("only one exporter"));
    }
}
