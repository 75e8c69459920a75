//! Persistence of the ranked signal table (CSV plus a Parquet copy).

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ratio::Ratio, SignalRecord};
use crate::error::{EngineError, EngineResult};

/// Column order of the persisted table.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "drug_name",
    "event_pt",
    "a",
    "b",
    "c",
    "d",
    "PRR",
    "ROR",
    "is_watchlist",
    "signal_flag",
];

/// One persisted row. Cells are the raw counts; ratios keep full precision and
/// undefined ratios are written as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub drug_name: String,
    pub event_pt: String,
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
    #[serde(rename = "PRR")]
    pub prr: f64,
    #[serde(rename = "ROR")]
    pub ror: f64,
    pub is_watchlist: bool,
    pub signal_flag: bool,
}

impl SignalRow {
    pub fn prr(&self) -> Ratio {
        Ratio::from_f64(self.prr)
    }

    pub fn ror(&self) -> Ratio {
        Ratio::from_f64(self.ror)
    }

    /// Whether the statistics of this row were computed on corrected cells.
    pub fn corrected(&self) -> bool {
        [self.a, self.b, self.c, self.d].contains(&0)
    }
}

impl From<&SignalRecord> for SignalRow {
    fn from(record: &SignalRecord) -> Self {
        SignalRow {
            drug_name: record.drug_name.clone(),
            event_pt: record.event_pt.clone(),
            a: record.cell.a,
            b: record.cell.b,
            c: record.cell.c,
            d: record.cell.d,
            prr: record.prr.to_f64(),
            ror: record.ror.to_f64(),
            is_watchlist: record.is_watchlist,
            signal_flag: record.signal_flag,
        }
    }
}

/// Serialise the table to CSV bytes.
pub fn to_csv_bytes(records: &[SignalRecord]) -> EngineResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(SignalRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::io("<csv buffer>", err.into_error()))
}

/// Output file names inside the tables directory.
pub const CSV_FILE: &str = "signals.csv";
pub const PARQUET_FILE: &str = "signals.parquet";

/// Write `signals.csv` and `signals.parquet` into `out_dir` as a single unit.
///
/// Both files are staged as `.tmp` siblings and only renamed into place once both are
/// complete. On any failure the staged files and anything already renamed are removed.
pub fn write_outputs(records: &[SignalRecord], out_dir: &Path) -> EngineResult<()> {
    let targets = [out_dir.join(CSV_FILE), out_dir.join(PARQUET_FILE)];
    let staged = [tmp_sibling(&targets[0]), tmp_sibling(&targets[1])];

    let result = stage_csv(records, &staged[0])
        .and_then(|_| stage_parquet(records, &staged[1]))
        .and_then(|_| commit(&staged, &targets));
    if let Err(err) = result {
        staged.iter().for_each(|path| discard(path));
        return Err(err);
    }
    info!(dir = %out_dir.display(), rows = records.len(), "wrote signal table");
    Ok(())
}

fn stage_csv(records: &[SignalRecord], tmp: &Path) -> EngineResult<()> {
    let bytes = to_csv_bytes(records)?;
    let mut file = File::create(tmp).map_err(|err| EngineError::io(tmp, err))?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(|err| EngineError::io(tmp, err))
}

fn stage_parquet(records: &[SignalRecord], tmp: &Path) -> EngineResult<()> {
    let rows: Vec<SignalRow> = records.iter().map(SignalRow::from).collect();
    let mut df = DataFrame::new(vec![
        Series::new(
            "drug_name".into(),
            rows.iter().map(|r| r.drug_name.clone()).collect::<Vec<_>>(),
        ),
        Series::new(
            "event_pt".into(),
            rows.iter().map(|r| r.event_pt.clone()).collect::<Vec<_>>(),
        ),
        Series::new("a".into(), rows.iter().map(|r| r.a).collect::<Vec<_>>()),
        Series::new("b".into(), rows.iter().map(|r| r.b).collect::<Vec<_>>()),
        Series::new("c".into(), rows.iter().map(|r| r.c).collect::<Vec<_>>()),
        Series::new("d".into(), rows.iter().map(|r| r.d).collect::<Vec<_>>()),
        Series::new("PRR".into(), rows.iter().map(|r| r.prr).collect::<Vec<_>>()),
        Series::new("ROR".into(), rows.iter().map(|r| r.ror).collect::<Vec<_>>()),
        Series::new(
            "is_watchlist".into(),
            rows.iter().map(|r| r.is_watchlist).collect::<Vec<_>>(),
        ),
        Series::new(
            "signal_flag".into(),
            rows.iter().map(|r| r.signal_flag).collect::<Vec<_>>(),
        ),
    ])?;
    let file = File::create(tmp).map_err(|err| EngineError::io(tmp, err))?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}

/// Rename every staged file onto its target; roll back the renamed ones if any fails.
fn commit(staged: &[PathBuf], targets: &[PathBuf]) -> EngineResult<()> {
    for (done, (tmp, target)) in staged.iter().zip(targets).enumerate() {
        if let Err(err) = std::fs::rename(tmp, target) {
            targets[..done].iter().for_each(|path| discard(path));
            return Err(EngineError::io(target, err));
        }
    }
    Ok(())
}

fn discard(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), %err, "could not remove output file");
        }
    }
}

/// Load a previously persisted CSV table in its stored order.
pub fn read_signal_table(path: &Path) -> EngineResult<Vec<SignalRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for result in reader.deserialize::<SignalRow>() {
        out.push(result?);
    }
    Ok(out)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
