//! Disproportionality engine: contingency cells, PRR/ROR, flags and ranking.

pub mod classify;
pub mod contingency;
pub mod correction;
pub mod output;
pub mod rank;
pub mod ratio;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    data::records::{self, CaseEventRecord},
    error::{EngineError, EngineResult},
};

use self::{
    classify::Watchlist,
    contingency::{Aggregates, Cell, PairKey},
    ratio::Ratio,
};

/// Minimum `a` for a pair to be flagged as a signal.
pub const SIGNAL_MIN_CASES: u64 = 10;
/// Minimum PRR for a pair to be flagged as a signal.
pub const SIGNAL_MIN_PRR: f64 = 2.0;
/// Pairs with fewer co-reported cases are not reported at all.
pub const MIN_REPORTABLE_CASES: u64 = 3;
/// Haldane-Anscombe increment applied when any cell is zero.
pub const CORRECTION_INCREMENT: f64 = 0.5;

/// Fixed numeric policy of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub signal_min_cases: u64,
    pub signal_min_prr: f64,
    pub min_reportable_cases: u64,
    pub correction_increment: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            signal_min_cases: SIGNAL_MIN_CASES,
            signal_min_prr: SIGNAL_MIN_PRR,
            min_reportable_cases: MIN_REPORTABLE_CASES,
            correction_increment: CORRECTION_INCREMENT,
        }
    }
}

/// Everything the engine reads besides the case table.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub watchlist: Watchlist,
    pub thresholds: Thresholds,
}

impl EngineConfig {
    pub fn new(watchlist: Watchlist) -> Self {
        Self {
            watchlist,
            thresholds: Thresholds::default(),
        }
    }
}

/// Fully evaluated drug-event pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub drug_name: String,
    pub event_pt: String,
    /// Uncorrected counts.
    pub cell: Cell,
    /// Whether PRR/ROR were computed on corrected cells.
    pub corrected: bool,
    pub prr: Ratio,
    pub ror: Ratio,
    pub is_watchlist: bool,
    pub signal_flag: bool,
}

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct SignalTable {
    /// Distinct cases in the input (`N`).
    pub total_cases: u64,
    /// Observed pairs before the sparse-pair filter.
    pub pairs_screened: usize,
    /// Pairs whose marginals produced a negative cell.
    pub rejected: Vec<PairKey>,
    /// Ranked, reportable pairs.
    pub records: Vec<SignalRecord>,
}

impl SignalTable {
    pub fn signal_count(&self) -> usize {
        self.records.iter().filter(|r| r.signal_flag).count()
    }
}

/// Evaluate a single pair from its raw cell.
pub fn evaluate_pair(key: &PairKey, cell: Cell, config: &EngineConfig) -> SignalRecord {
    let (adjusted, corrected) = correction::correct(cell, config.thresholds.correction_increment);
    let prr = ratio::prr(&adjusted);
    let ror = ratio::ror(&adjusted);
    if !prr.is_defined() || !ror.is_defined() {
        debug!(drug = %key.drug, event = %key.event, ?cell, "undefined ratio statistic");
    }
    let flags = classify::classify(
        &key.event,
        cell.a,
        prr,
        &config.watchlist,
        &config.thresholds,
    );
    SignalRecord {
        drug_name: key.drug.clone(),
        event_pt: key.event.clone(),
        cell,
        corrected,
        prr,
        ror,
        is_watchlist: flags.is_watchlist,
        signal_flag: flags.signal_flag,
    }
}

/// Run the whole engine over an in-memory case table.
pub fn detect(rows: &[CaseEventRecord], config: &EngineConfig) -> EngineResult<SignalTable> {
    if rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    let aggregates = Aggregates::from_records(rows);
    info!(
        total_cases = aggregates.total_cases,
        drugs = aggregates.drug_cases.len(),
        events = aggregates.event_cases.len(),
        pairs = aggregates.pair_cases.len(),
        "aggregated case table"
    );

    Ok(screen(&aggregates, config))
}

/// Evaluate and rank every observed pair of `aggregates`.
///
/// Pairs whose marginals yield a negative cell are skipped and listed in
/// [`SignalTable::rejected`]; the remaining pairs are still reported.
pub fn screen(aggregates: &Aggregates, config: &EngineConfig) -> SignalTable {
    let mut rejected = Vec::new();
    let mut evaluated = Vec::with_capacity(aggregates.pair_cases.len());
    for (key, cell) in aggregates.cells() {
        match cell {
            Ok(cell) => evaluated.push(evaluate_pair(key, cell, config)),
            Err(err) => {
                warn!(%err, "rejecting pair");
                rejected.push(key.clone());
            }
        }
    }

    let pairs_screened = evaluated.len() + rejected.len();
    let records = rank::rank(evaluated, config.thresholds.min_reportable_cases);
    SignalTable {
        total_cases: aggregates.total_cases,
        pairs_screened,
        rejected,
        records,
    }
}

/// Load the clean table, run the engine and persist CSV and Parquet outputs.
pub fn compute(settings: &Settings) -> Result<SignalTable> {
    let input = settings.clean_table_path();
    let watchlist = settings.watchlist()?;
    let config = EngineConfig::new(watchlist);
    let table = compute_file(&input, &settings.tables_dir(), &config)
        .with_context(|| format!("computing signals from {}", input.display()))?;

    let top: Vec<_> = table
        .records
        .iter()
        .filter(|r| r.is_watchlist)
        .take(5)
        .map(|r| format!("{} + {}", r.drug_name, r.event_pt))
        .collect();
    info!(?top, "top watchlist pairs");
    Ok(table)
}

/// File-level entry point: read `input`, write `signals.csv` and `signals.parquet` into
/// `out_dir`. Nothing is written when the run fails.
pub fn compute_file(
    input: &Path,
    out_dir: &Path,
    config: &EngineConfig,
) -> EngineResult<SignalTable> {
    let rows = records::read_case_events(input)?;
    let table = detect(&rows, config)?;

    std::fs::create_dir_all(out_dir).map_err(|err| EngineError::io(out_dir, err))?;
    output::write_outputs(&table.records, out_dir)?;
    info!(
        total_cases = table.total_cases,
        screened = table.pairs_screened,
        reported = table.records.len(),
        signals = table.signal_count(),
        rejected = table.rejected.len(),
        "signal detection complete"
    );
    Ok(table)
}
