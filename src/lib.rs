//! Disproportionality screening of adverse-event case reports.
//!
//! The long-format case table (one row per case, drug and event) is reduced to a 2x2
//! contingency table per observed drug-event pair, scored with PRR and ROR, flagged
//! against a watchlist and a fixed signal threshold, and ranked for review.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod signals;

pub use error::{EngineError, EngineResult};
pub use signals::{detect, EngineConfig, SignalRecord, SignalTable, Thresholds};
