//! Error taxonomy for the signal-detection engine.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading the case table or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input table lacks one or more required columns.
    #[error("input {path} is missing required column(s): {}", missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    /// Input table has a header but no data rows.
    #[error("input table has no rows; refusing to emit an empty signal table")]
    EmptyInput,

    /// A required field is blank.
    #[error("data row {row}: required field '{column}' is empty")]
    InvalidRow { row: u64, column: &'static str },

    /// Derived contingency cell came out negative.
    #[error(
        "inconsistent marginals for ({drug}, {event}): a={a} n_drug={n_drug} n_event={n_event} N={total}"
    )]
    InconsistentMarginals {
        drug: String,
        event: String,
        a: u64,
        n_drug: u64,
        n_event: u64,
        total: u64,
    },

    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("parquet export failed: {0}")]
    Parquet(#[from] polars::prelude::PolarsError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
