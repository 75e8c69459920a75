//! CLI entry-point for the cleaning merge.

use anyhow::Result;
use tracing::{info, instrument};

use crate::{config::Settings, data};

#[instrument(skip(settings))]
pub async fn run(settings: Settings) -> Result<()> {
    let report = data::clean::clean(&settings)?;
    info!(?report, "clean stage finished");
    Ok(())
}
