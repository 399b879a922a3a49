//! # obsbox
//!
//! Command-line entry point: parses arguments, installs logging and
//! dispatches to a subcommand.

mod cli;
mod commands;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref(), cli.log_format)?;

    match &cli.command {
        Command::Check(args) => commands::check::run(&cli.config, args),
        Command::Run(args) => commands::run::run(&cli.config, args).await,
    }
}
