//! `obsbox run`: drive the simulation until a shutdown signal arrives.

use std::future;
use std::path::Path;

use anyhow::Context;
use obsbox_config::ExportConfig;
use obsbox_generator::{Generator, MetricRegistry};
use tokio::time::{Instant, Interval, interval_at};

use crate::cli::RunArgs;

pub async fn run(path: &Path, args: &RunArgs) -> anyhow::Result<()> {
    let config = obsbox_config::load(path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    let generator = Generator::new(&config).context("failed to build runtime graph")?;
    let registry = MetricRegistry::new(&config, &generator)?;
    log_export(&config.export);

    if let Err(err) = generator.start() {
        generator.stop();
        return Err(err.into());
    }
    tracing::info!(metrics = registry.len(), "simulation running");

    let mut report = args
        .report_interval
        .map(|period| interval_at(Instant::now() + period, period));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            signal = &mut shutdown => break signal,
            () = next_report(report.as_mut()) => report_values(&registry),
        }
    };

    generator.stop();
    let signal = outcome?;
    tracing::info!(signal, "shut down");
    Ok(())
}

fn log_export(export: &ExportConfig) {
    if let Some(prometheus) = export.prometheus.as_ref().filter(|p| p.enabled) {
        tracing::info!(
            port = prometheus.port,
            path = %prometheus.path,
            "prometheus export configured; no endpoint is served"
        );
    }
    if let Some(otel) = export.otel.as_ref().filter(|o| o.enabled) {
        tracing::info!(
            transport = %otel.transport,
            endpoint = %format!("{}:{}", otel.host, otel.port),
            "otlp export configured; nothing is pushed"
        );
    }
}

async fn next_report(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}

// Peek: a plain read would reset on_read values.
fn report_values(registry: &MetricRegistry) {
    for descriptor in registry {
        tracing::info!(
            name = %descriptor.prometheus_name,
            kind = %descriptor.kind,
            value = descriptor.value.peek(),
            "metric"
        );
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            Ok("SIGINT")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    Ok("Ctrl-C")
}
