//! Command implementations

mod config;
mod generate_config;
mod lint;
mod publish;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Publish(args) => publish::execute(args, &output, cli.dry_run),
        Commands::GenerateConfig(args) => generate_config::execute(args, &output, cli.dry_run),
        Commands::Lint(args) => lint::execute(args, &output),
        Commands::Config(args) => config::execute(args, &output),
    }
}
