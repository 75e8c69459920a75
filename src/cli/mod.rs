//! Command-line interface wiring for pv-signal-lab.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod clean;
pub mod generate;
pub mod run;
pub mod serve;
pub mod signal;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Pharmacovigilance disproportionality screening",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Generate(args) => generate::run(args, settings).await,
            Commands::Clean => clean::run(settings).await,
            Commands::Signal => signal::run(settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
            Commands::Run(args) => run::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write synthetic raw case, drug and event tables.
    Generate(generate::Args),
    /// Check linkage and merge raw tables into the long case table.
    Clean,
    /// Compute PRR/ROR, flags and the ranked signal table.
    Signal,
    /// Serve the signal table as JSON.
    Serve(serve::Args),
    /// Generate, clean and compute signals in one go.
    Run(generate::Args),
}
