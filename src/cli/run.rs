//! CLI entry-point chaining generate, clean and signal.

use anyhow::Result;
use tracing::{info, instrument};

use crate::{cli::generate, config::Settings, data};

#[instrument(skip(settings))]
pub async fn run(args: generate::Args, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);
    data::synth::generate(&settings)?;
    let report = data::clean::clean(&settings)?;
    info!(?report, "clean stage finished");
    super::signal::run(settings).await
}
