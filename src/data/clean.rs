//! Linkage checks and the drugs x events merge producing the long case table.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::synth::{CaseRow, DrugRow, EventRow};
use crate::config::Settings;

/// One row of `processed/clean_data.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CleanRow {
    pub case_id: String,
    pub report_year: u16,
    pub age: u32,
    pub sex: String,
    pub reporter_type: String,
    pub serious: String,
    pub drug_name: String,
    pub role_cod: String,
    pub indication: String,
    pub event_pt: String,
}

/// Counters describing what the merge had to discard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub duplicate_cases: usize,
    pub orphan_drugs: usize,
    pub orphan_events: usize,
    pub duplicate_rows: usize,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result.with_context(|| format!("parse {}", path.display()))?);
    }
    Ok(rows)
}

/// Load a previously written `processed/clean_data.csv`.
pub fn read_clean_table(path: &Path) -> Result<Vec<CleanRow>> {
    read_rows(path)
}

/// Inner-join cases with every drug and every event of the same case.
pub fn merge(
    cases: Vec<CaseRow>,
    drugs: Vec<DrugRow>,
    events: Vec<EventRow>,
) -> (Vec<CleanRow>, CleanReport) {
    let mut report = CleanReport::default();

    let mut seen = HashSet::new();
    let before = cases.len();
    let cases: Vec<CaseRow> = cases
        .into_iter()
        .filter(|case| seen.insert(case.case_id.clone()))
        .collect();
    report.duplicate_cases = before - cases.len();
    if report.duplicate_cases > 0 {
        warn!(count = report.duplicate_cases, "dropping duplicate case_ids");
    }

    let mut drugs_by_case: HashMap<&str, Vec<&DrugRow>> = HashMap::new();
    for drug in &drugs {
        if seen.contains(&drug.case_id) {
            drugs_by_case.entry(drug.case_id.as_str()).or_default().push(drug);
        } else {
            report.orphan_drugs += 1;
        }
    }
    let mut events_by_case: HashMap<&str, Vec<&EventRow>> = HashMap::new();
    for event in &events {
        if seen.contains(&event.case_id) {
            events_by_case.entry(event.case_id.as_str()).or_default().push(event);
        } else {
            report.orphan_events += 1;
        }
    }
    if report.orphan_drugs > 0 {
        warn!(count = report.orphan_drugs, "drug records have no matching case; dropping");
    }
    if report.orphan_events > 0 {
        warn!(count = report.orphan_events, "event records have no matching case; dropping");
    }

    let mut rows = IndexSet::new();
    let mut produced = 0usize;
    for case in &cases {
        let (Some(case_drugs), Some(case_events)) = (
            drugs_by_case.get(case.case_id.as_str()),
            events_by_case.get(case.case_id.as_str()),
        ) else {
            continue;
        };
        for drug in case_drugs {
            for event in case_events {
                produced += 1;
                rows.insert(CleanRow {
                    case_id: case.case_id.clone(),
                    report_year: case.report_year,
                    age: case.age,
                    sex: case.sex.clone(),
                    reporter_type: case.reporter_type.clone(),
                    serious: case.serious.clone(),
                    drug_name: drug.drug_name.clone(),
                    role_cod: drug.role_cod.clone(),
                    indication: drug.indication.clone(),
                    event_pt: event.event_pt.clone(),
                });
            }
        }
    }
    report.duplicate_rows = produced - rows.len();
    if report.duplicate_rows > 0 {
        info!(count = report.duplicate_rows, "dropped duplicate rows during merge");
    }

    (rows.into_iter().collect(), report)
}

/// Read `raw/*.csv`, merge, and write `processed/clean_data.csv`.
#[instrument(skip(settings))]
pub fn clean(settings: &Settings) -> Result<CleanReport> {
    let raw = settings.raw_dir();
    let cases: Vec<CaseRow> = read_rows(&raw.join("cases.csv"))?;
    let drugs: Vec<DrugRow> = read_rows(&raw.join("drugs.csv"))?;
    let events: Vec<EventRow> = read_rows(&raw.join("events.csv"))?;
    info!(
        cases = cases.len(),
        drugs = drugs.len(),
        events = events.len(),
        "loaded raw tables"
    );

    let (rows, report) = merge(cases, drugs, events);

    let out_path = settings.clean_table_path();
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("create {}", out_path.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %out_path.display(), rows = rows.len(), "cleaning complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str) -> CaseRow {
        CaseRow {
            case_id: id.into(),
            age: 50,
            sex: "F".into(),
            reporter_type: "Physician".into(),
            serious: "No".into(),
            report_year: 2024,
        }
    }

    fn drug(id: &str, name: &str) -> DrugRow {
        DrugRow {
            case_id: id.into(),
            drug_name: name.into(),
            role_cod: "PS".into(),
            indication: "Pain management".into(),
        }
    }

    fn event(id: &str, pt: &str) -> EventRow {
        EventRow {
            case_id: id.into(),
            event_pt: pt.into(),
        }
    }

    #[test]
    fn merge_is_a_per_case_cartesian_product() {
        let (rows, report) = merge(
            vec![case("C1"), case("C2")],
            vec![drug("C1", "Methadone"), drug("C1", "Morphine"), drug("C2", "Oxycodone")],
            vec![event("C1", "Sedation"), event("C1", "Nausea"), event("C2", "Rash")],
        );
        assert_eq!(rows.len(), 5);
        assert_eq!(report, CleanReport::default());
    }

    #[test]
    fn orphans_and_duplicates_are_dropped() {
        let (rows, report) = merge(
            vec![case("C1"), case("C1")],
            vec![drug("C1", "Methadone"), drug("C9", "Morphine")],
            vec![event("C1", "Sedation"), event("C1", "Sedation"), event("C8", "Rash")],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(
            report,
            CleanReport {
                duplicate_cases: 1,
                orphan_drugs: 1,
                orphan_events: 1,
                duplicate_rows: 1,
            }
        );
    }
}
