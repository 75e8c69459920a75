//! CLI entry-point for computing signal metrics.

use anyhow::Result;
use tracing::instrument;

use crate::{config::Settings, signals};

#[instrument(skip(settings))]
pub async fn run(settings: Settings) -> Result<()> {
    let table = signals::compute(&settings)?;
    println!(
        "{} pairs reported (a >= {}), {} signals, N = {}",
        table.records.len(),
        signals::MIN_REPORTABLE_CASES,
        table.signal_count(),
        table.total_cases
    );
    Ok(())
}
