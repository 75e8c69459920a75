//! HTTP route handlers for Axum.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use indexmap::IndexSet;
use serde::Deserialize;
use tracing::warn;

use crate::{
    api::types::{CaseDetailDto, CaseDrugDto, CasesDto, DemographicsDto, SignalDto, SummaryDto},
    config::Settings,
    data::{
        clean::{self, CleanRow},
        records::{self, CaseEventRecord},
        synth::FOCUS_DRUG,
    },
    signals::{output, MIN_REPORTABLE_CASES},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Display filters. They narrow the persisted table and never re-classify rows.
#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub min_a: Option<u64>,
    /// Comma separated drug names.
    pub drug: Option<String>,
    #[serde(default)]
    pub watchlist_only: bool,
}

pub async fn list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> ApiResult<Vec<SignalDto>> {
    let rows = load_signals(&state.settings)?;
    let min_a = query
        .min_a
        .unwrap_or(MIN_REPORTABLE_CASES)
        .max(MIN_REPORTABLE_CASES);
    let drugs: BTreeSet<&str> = query
        .drug
        .as_deref()
        .map(|raw| raw.split(',').map(str::trim).filter(|d| !d.is_empty()).collect())
        .unwrap_or_default();

    let out = rows
        .into_iter()
        .filter(|row| row.a >= min_a)
        .filter(|row| drugs.is_empty() || drugs.contains(row.drug_name.as_str()))
        .filter(|row| !query.watchlist_only || row.is_watchlist)
        .map(SignalDto::from)
        .collect();
    Ok(Json(out))
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<SummaryDto> {
    let rows = load_signals(&state.settings)?;
    let cases = load_cases(&state.settings)?;
    let distinct_cases = |drug: Option<&str>| {
        cases
            .iter()
            .filter(|r| drug.map_or(true, |d| r.drug_name == d))
            .map(|r| r.case_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    };
    Ok(Json(SummaryDto {
        total_cases: distinct_cases(None),
        case_rows: cases.len(),
        methadone_cases: distinct_cases(Some(FOCUS_DRUG)),
        reported_pairs: rows.len(),
        signals: rows.iter().filter(|r| r.signal_flag).count(),
    }))
}

pub async fn list_cases(
    Path((drug, event)): Path<(String, String)>,
    State(state): State<AppState>,
) -> ApiResult<CasesDto> {
    let cases = load_cases(&state.settings)?;
    let case_ids: BTreeSet<String> = cases
        .into_iter()
        .filter(|r| r.drug_name == drug && r.event_pt == event)
        .map(|r| r.case_id)
        .collect();
    if case_ids.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no cases report {drug} with {event}"),
        ));
    }
    Ok(Json(CasesDto {
        drug_name: drug,
        event_pt: event,
        case_ids: case_ids.into_iter().collect(),
    }))
}

/// Every case id in the clean table, sorted.
pub async fn all_cases(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let cases = load_cases(&state.settings)?;
    let ids: BTreeSet<String> = cases.into_iter().map(|r| r.case_id).collect();
    Ok(Json(ids.into_iter().collect()))
}

pub async fn case_detail(
    Path(case_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<CaseDetailDto> {
    let rows: Vec<CleanRow> = load_clean_rows(&state.settings)?
        .into_iter()
        .filter(|r| r.case_id == case_id)
        .collect();
    let Some(first) = rows.first() else {
        return Err((StatusCode::NOT_FOUND, format!("unknown case {case_id}")));
    };
    let demographics = DemographicsDto::from(first);

    let drugs: IndexSet<CaseDrugDto> = rows
        .iter()
        .map(|r| CaseDrugDto {
            drug_name: r.drug_name.clone(),
            role_cod: r.role_cod.clone(),
            indication: r.indication.clone(),
        })
        .collect();
    let events: IndexSet<String> = rows.iter().map(|r| r.event_pt.clone()).collect();
    Ok(Json(CaseDetailDto {
        case_id,
        demographics,
        drugs: drugs.into_iter().collect(),
        events: events.into_iter().collect(),
    }))
}

fn load_signals(settings: &Settings) -> Result<Vec<output::SignalRow>, (StatusCode, String)> {
    let path = settings.signals_path();
    if !path.exists() {
        warn!("signals.csv missing; run signal first");
        return Err((
            StatusCode::NOT_FOUND,
            "signals.csv missing; run signal first".to_string(),
        ));
    }
    output::read_signal_table(&path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn load_cases(settings: &Settings) -> Result<Vec<CaseEventRecord>, (StatusCode, String)> {
    let path = settings.clean_table_path();
    if !path.exists() {
        return Err((
            StatusCode::NOT_FOUND,
            "clean_data.csv missing; run clean first".to_string(),
        ));
    }
    records::read_case_events(&path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn load_clean_rows(settings: &Settings) -> Result<Vec<CleanRow>, (StatusCode, String)> {
    let path = settings.clean_table_path();
    if !path.exists() {
        return Err((
            StatusCode::NOT_FOUND,
            "clean_data.csv missing; run clean first".to_string(),
        ));
    }
    clean::read_clean_table(&path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
}
