//! Case-level aggregation and 2x2 contingency cell derivation.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    data::records::CaseEventRecord,
    error::{EngineError, EngineResult},
};

/// Drug-event pair identifying one row of the signal table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub drug: String,
    pub event: String,
}

impl PairKey {
    pub fn new(drug: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            drug: drug.into(),
            event: event.into(),
        }
    }
}

/// Raw 2x2 counts for one pair.
///
/// `a` drug and event, `b` drug without event, `c` event without drug, `d` neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
}

impl Cell {
    pub fn n_drug(&self) -> u64 {
        self.a + self.b
    }

    pub fn n_event(&self) -> u64 {
        self.a + self.c
    }

    pub fn total(&self) -> u64 {
        self.a + self.b + self.c + self.d
    }

    pub fn has_zero(&self) -> bool {
        [self.a, self.b, self.c, self.d].contains(&0)
    }
}

/// Distinct-case counts over one snapshot of the case table.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Distinct cases in the whole table (`N`).
    pub total_cases: u64,
    pub drug_cases: BTreeMap<String, u64>,
    pub event_cases: BTreeMap<String, u64>,
    pub pair_cases: BTreeMap<PairKey, u64>,
}

impl Aggregates {
    /// Count distinct cases per drug, per event and per observed pair.
    pub fn from_records(rows: &[CaseEventRecord]) -> Self {
        #[derive(Default)]
        struct CaseSummary<'r> {
            drugs: HashSet<&'r str>,
            events: HashSet<&'r str>,
            pairs: HashSet<(&'r str, &'r str)>,
        }

        let mut cases: HashMap<&str, CaseSummary<'_>> = HashMap::new();
        for row in rows {
            let summary = cases.entry(row.case_id.as_str()).or_default();
            summary.drugs.insert(row.drug_name.as_str());
            summary.events.insert(row.event_pt.as_str());
            summary
                .pairs
                .insert((row.drug_name.as_str(), row.event_pt.as_str()));
        }

        let mut aggregates = Aggregates {
            total_cases: cases.len() as u64,
            ..Default::default()
        };
        for summary in cases.values() {
            for drug in &summary.drugs {
                *aggregates.drug_cases.entry(drug.to_string()).or_insert(0) += 1;
            }
            for event in &summary.events {
                *aggregates.event_cases.entry(event.to_string()).or_insert(0) += 1;
            }
            for (drug, event) in &summary.pairs {
                *aggregates
                    .pair_cases
                    .entry(PairKey::new(*drug, *event))
                    .or_insert(0) += 1;
            }
        }
        aggregates
    }

    /// Derive cells for every observed pair, in key order.
    pub fn cells(&self) -> impl Iterator<Item = (&PairKey, EngineResult<Cell>)> + '_ {
        self.pair_cases.iter().map(move |(key, &a)| {
            let n_drug = self.drug_cases.get(&key.drug).copied().unwrap_or(0);
            let n_event = self.event_cases.get(&key.event).copied().unwrap_or(0);
            (key, derive_cell(key, a, n_drug, n_event, self.total_cases))
        })
    }
}

/// `b = n_drug - a`, `c = n_event - a`, `d = N - n_drug - c`.
///
/// Any negative cell means the marginals and the joint count come from different
/// case universes; the pair is reported as [`EngineError::InconsistentMarginals`].
pub fn derive_cell(
    key: &PairKey,
    a: u64,
    n_drug: u64,
    n_event: u64,
    total: u64,
) -> EngineResult<Cell> {
    let inconsistent = || EngineError::InconsistentMarginals {
        drug: key.drug.clone(),
        event: key.event.clone(),
        a,
        n_drug,
        n_event,
        total,
    };
    let b = n_drug.checked_sub(a).ok_or_else(inconsistent)?;
    let c = n_event.checked_sub(a).ok_or_else(inconsistent)?;
    let d = total
        .checked_sub(n_drug)
        .and_then(|rest| rest.checked_sub(c))
        .ok_or_else(inconsistent)?;
    Ok(Cell { a, b, c, d })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_rows_count_one_case() {
        let rows = vec![
            CaseEventRecord::new("C1", "Methadone", "Sedation"),
            CaseEventRecord::new("C1", "Methadone", "Sedation"),
            CaseEventRecord::new("C1", "Methadone", "Sedation"),
            CaseEventRecord::new("C2", "Morphine", "Sedation"),
        ];
        let agg = Aggregates::from_records(&rows);
        assert_eq!(agg.total_cases, 2);
        assert_eq!(agg.pair_cases[&PairKey::new("Methadone", "Sedation")], 1);
        assert_eq!(agg.event_cases["Sedation"], 2);
        assert_eq!(agg.drug_cases["Methadone"], 1);
    }

    #[test]
    fn unobserved_pairs_are_not_materialised() {
        let rows = vec![
            CaseEventRecord::new("C1", "Methadone", "Sedation"),
            CaseEventRecord::new("C2", "Morphine", "Nausea"),
        ];
        let agg = Aggregates::from_records(&rows);
        assert_eq!(agg.pair_cases.len(), 2);
        assert!(!agg
            .pair_cases
            .contains_key(&PairKey::new("Methadone", "Nausea")));
    }

    #[test]
    fn reference_scenario_cells() {
        let key = PairKey::new("X", "Y");
        let cell = derive_cell(&key, 10, 20, 15, 100).unwrap();
        assert_eq!(cell, Cell { a: 10, b: 10, c: 5, d: 75 });
        assert_eq!(cell.n_drug(), 20);
        assert_eq!(cell.n_event(), 15);
        assert_eq!(cell.total(), 100);
    }

    #[test]
    fn negative_d_is_inconsistent() {
        let key = PairKey::new("X", "Y");
        let err = derive_cell(&key, 1, 8, 8, 10).unwrap_err();
        assert!(matches!(err, EngineError::InconsistentMarginals { a: 1, .. }));
    }

    #[test]
    fn cells_report_inconsistent_pairs_individually() {
        let agg = Aggregates {
            total_cases: 100,
            drug_cases: BTreeMap::from([("X".to_string(), 20)]),
            event_cases: BTreeMap::from([("Y".to_string(), 15), ("Q".to_string(), 2)]),
            pair_cases: BTreeMap::from([
                (PairKey::new("X", "Y"), 10),
                (PairKey::new("X", "Q"), 4),
            ]),
        };
        let cells: BTreeMap<_, _> = agg.cells().collect();
        assert!(matches!(
            cells[&PairKey::new("X", "Q")],
            Err(EngineError::InconsistentMarginals { a: 4, n_event: 2, .. })
        ));
        assert_eq!(
            *cells[&PairKey::new("X", "Y")].as_ref().unwrap(),
            Cell { a: 10, b: 10, c: 5, d: 75 }
        );
    }
}
