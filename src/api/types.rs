//! Shared DTOs for JSON responses.

use serde::Serialize;

use crate::{data::clean::CleanRow, signals::output::SignalRow};

/// Persisted signal row; undefined ratios serialise as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct SignalDto {
    pub drug_name: String,
    pub event_pt: String,
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
    pub prr: Option<f64>,
    pub ror: Option<f64>,
    pub is_watchlist: bool,
    pub signal_flag: bool,
}

impl From<SignalRow> for SignalDto {
    fn from(row: SignalRow) -> Self {
        SignalDto {
            prr: row.prr().value(),
            ror: row.ror().value(),
            drug_name: row.drug_name,
            event_pt: row.event_pt,
            a: row.a,
            b: row.b,
            c: row.c,
            d: row.d,
            is_watchlist: row.is_watchlist,
            signal_flag: row.signal_flag,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryDto {
    pub total_cases: usize,
    pub case_rows: usize,
    /// Distinct cases reporting the drug with the injected signal.
    pub methadone_cases: usize,
    pub reported_pairs: usize,
    pub signals: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CasesDto {
    pub drug_name: String,
    pub event_pt: String,
    pub case_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemographicsDto {
    pub age: u32,
    pub sex: String,
    pub reporter_type: String,
    pub serious: String,
    pub report_year: u16,
}

impl From<&CleanRow> for DemographicsDto {
    fn from(row: &CleanRow) -> Self {
        DemographicsDto {
            age: row.age,
            sex: row.sex.clone(),
            reporter_type: row.reporter_type.clone(),
            serious: row.serious.clone(),
            report_year: row.report_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CaseDrugDto {
    pub drug_name: String,
    pub role_cod: String,
    pub indication: String,
}

/// One case as reviewed: demographics, distinct drugs and distinct events.
#[derive(Debug, Clone, Serialize)]
pub struct CaseDetailDto {
    pub case_id: String,
    pub demographics: DemographicsDto,
    pub drugs: Vec<CaseDrugDto>,
    pub events: Vec<String>,
}
