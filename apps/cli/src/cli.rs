//! Argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Synthetic, coherent telemetry for exercising observability pipelines.
#[derive(Debug, Parser)]
#[command(name = "obsbox", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, global = true, env = "OBSBOX_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Log filter, e.g. `debug` or `obsbox_config=debug`. Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and resolve the configuration, then summarize it.
    Check(CheckArgs),
    /// Run the simulation until interrupted.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Print the resolved configuration as YAML.
    #[arg(long)]
    pub print: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log every metric's current value at this interval, e.g. `5s`.
    #[arg(long, value_parser = positive_duration)]
    pub report_interval: Option<Duration>,
}

fn positive_duration(value: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if duration.is_zero() {
        return Err("interval must be greater than zero".to_owned());
    }
    Ok(duration)
}
