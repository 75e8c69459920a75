//! Long-format case/drug/event rows consumed by the signal engine.

use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};

/// Columns the engine cannot run without.
pub const REQUIRED_COLUMNS: [&str; 3] = ["case_id", "drug_name", "event_pt"];

/// One (case, drug, event) triple. Other case attributes in the file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaseEventRecord {
    pub case_id: String,
    pub drug_name: String,
    pub event_pt: String,
}

impl CaseEventRecord {
    pub fn new(case_id: &str, drug_name: &str, event_pt: &str) -> Self {
        Self {
            case_id: case_id.to_string(),
            drug_name: drug_name.to_string(),
            event_pt: event_pt.to_string(),
        }
    }

    fn blank_field(&self) -> Option<&'static str> {
        [
            ("case_id", &self.case_id),
            ("drug_name", &self.drug_name),
            ("event_pt", &self.event_pt),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(column, _)| column)
    }
}

/// Load the case table from disk, enforcing schema and row integrity.
pub fn read_case_events(path: &Path) -> EngineResult<Vec<CaseEventRecord>> {
    let file = File::open(path).map_err(|err| EngineError::io(path, err))?;
    let rows = read_case_events_from(file, path)?;
    info!(path = %path.display(), rows = rows.len(), "loaded case-event table");
    Ok(rows)
}

/// Reader-based variant of [`read_case_events`]; `origin` only labels errors.
pub fn read_case_events_from<R: Read>(
    source: R,
    origin: &Path,
) -> EngineResult<Vec<CaseEventRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::Schema {
            path: origin.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<CaseEventRecord>().enumerate() {
        let row = result?;
        if let Some(column) = row.blank_field() {
            return Err(EngineError::InvalidRow {
                row: idx as u64 + 1,
                column,
            });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> EngineResult<Vec<CaseEventRecord>> {
        read_case_events_from(text.as_bytes(), Path::new("inline.csv"))
    }

    #[test]
    fn extra_columns_are_ignored() {
        let rows = parse("case_id,age,drug_name,role_cod,event_pt\nC1,40,Morphine,PS,Nausea\n")
            .unwrap();
        assert_eq!(rows, vec![CaseEventRecord::new("C1", "Morphine", "Nausea")]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = parse("case_id,drug_name\nC1,Morphine\n").unwrap_err();
        match err {
            EngineError::Schema { missing, .. } => assert_eq!(missing, vec!["event_pt"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_is_empty_input() {
        let err = parse("case_id,drug_name,event_pt\n").unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput));
    }

    #[test]
    fn blank_drug_is_rejected() {
        let err = parse("case_id,drug_name,event_pt\nC1,Morphine,Nausea\nC2, ,Rash\n").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidRow {
                row: 2,
                column: "drug_name"
            }
        ));
    }
}
