//! Case table ingestion: synthetic generation, cleaning merge and engine input rows.

pub mod clean;
pub mod records;
pub mod synth;
