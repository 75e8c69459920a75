//! CLI entry-point for synthetic data generation.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, data};

/// Args for the `generate` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Override the number of synthetic cases.
    #[arg(long)]
    pub n_cases: Option<usize>,
    /// Override the RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(n_cases) = self.n_cases {
            settings.n_cases = n_cases;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        settings
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);
    data::synth::generate(&settings)?;
    Ok(())
}
