//! Seeded synthetic case/drug/event tables with an injected Methadone signal.

use std::{collections::HashSet, f64::consts::PI, path::Path};

use anyhow::{Context, Result};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{config::Settings, signals::classify::DEFAULT_WATCHLIST};

const DRUGS: &[(&str, f64)] = &[
    ("Methadone", 0.3),
    ("Buprenorphine", 0.2),
    ("Morphine", 0.2),
    ("Oxycodone", 0.3),
];

const NOISE_EVENTS: &[&str] = &[
    "Headache",
    "Dizziness",
    "Rash",
    "Vomiting",
    "Insomnia",
    "Anxiety",
    "Fatigue",
    "Diarrhea",
    "Pruritus",
    "Tremor",
];

const SEXES: &[(&str, f64)] = &[("M", 0.48), ("F", 0.48), ("Unknown", 0.04)];
const REPORTERS: &[(&str, f64)] = &[("Physician", 0.6), ("Pharmacist", 0.3), ("Consumer", 0.1)];
const SERIOUSNESS: &[(&str, f64)] = &[("Yes", 0.4), ("No", 0.5), ("Unknown", 0.1)];
const EVENTS_PER_CASE: &[(usize, f64)] = &[(1, 0.7), (2, 0.2), (3, 0.1)];

/// Drug carrying the injected signal.
pub const FOCUS_DRUG: &str = "Methadone";

const CONCOMITANT_RATE: f64 = 0.3;
const REPORT_YEAR: u16 = 2024;

/// Boosted event weights for cases exposed to Methadone.
const METHADONE_BOOSTS: &[(&str, f64)] = &[
    ("QT prolongation", 8.0),
    ("Respiratory depression", 6.0),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRow {
    pub case_id: String,
    pub age: u32,
    pub sex: String,
    pub reporter_type: String,
    pub serious: String,
    pub report_year: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugRow {
    pub case_id: String,
    pub drug_name: String,
    pub role_cod: String,
    pub indication: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    pub case_id: String,
    pub event_pt: String,
}

/// In-memory result of one generation run.
#[derive(Debug, Clone, Default)]
pub struct SyntheticTables {
    pub cases: Vec<CaseRow>,
    pub drugs: Vec<DrugRow>,
    pub events: Vec<EventRow>,
}

impl SyntheticTables {
    /// Distinct cases reporting both `drug` and `event`.
    pub fn co_reported(&self, drug: &str, event: &str) -> usize {
        let drug_cases: HashSet<&str> = self
            .drugs
            .iter()
            .filter(|r| r.drug_name == drug)
            .map(|r| r.case_id.as_str())
            .collect();
        self.events
            .iter()
            .filter(|r| r.event_pt == event && drug_cases.contains(r.case_id.as_str()))
            .map(|r| r.case_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

fn pick<'a, T>(rng: &mut StdRng, table: &'a [(T, f64)]) -> Result<&'a T> {
    Ok(&table.choose_weighted(rng, |(_, w)| *w)?.0)
}

fn normal(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Build the three raw tables deterministically from `seed`.
pub fn synthesise(n_cases: usize, seed: u64) -> Result<SyntheticTables> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tables = SyntheticTables::default();

    for i in 1..=n_cases {
        let case_id = format!("CASE-{i:04}");
        let age = normal(&mut rng, 55.0, 15.0).trunc().clamp(0.0, 100.0) as u32;
        tables.cases.push(CaseRow {
            case_id: case_id.clone(),
            age,
            sex: pick(&mut rng, SEXES)?.to_string(),
            reporter_type: pick(&mut rng, REPORTERS)?.to_string(),
            serious: pick(&mut rng, SERIOUSNESS)?.to_string(),
            report_year: REPORT_YEAR,
        });

        let primary = *pick(&mut rng, DRUGS)?;
        let indication = if primary == FOCUS_DRUG {
            "Opioid dependence"
        } else {
            "Pain management"
        };
        tables.drugs.push(DrugRow {
            case_id: case_id.clone(),
            drug_name: primary.to_string(),
            role_cod: "PS".to_string(),
            indication: indication.to_string(),
        });
        let mut has_methadone = primary == FOCUS_DRUG;

        if rng.gen::<f64>() < CONCOMITANT_RATE {
            let others: Vec<&str> = DRUGS
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| *name != primary)
                .collect();
            if let Some(concomitant) = others.choose(&mut rng) {
                has_methadone |= *concomitant == FOCUS_DRUG;
                tables.drugs.push(DrugRow {
                    case_id: case_id.clone(),
                    drug_name: concomitant.to_string(),
                    role_cod: "SS".to_string(),
                    indication: "Pain management".to_string(),
                });
            }
        }

        let pool: Vec<(&str, f64)> = DEFAULT_WATCHLIST
            .iter()
            .chain(NOISE_EVENTS)
            .map(|event| {
                let boost = METHADONE_BOOSTS
                    .iter()
                    .find(|(name, _)| has_methadone && name == event)
                    .map_or(1.0, |(_, w)| *w);
                (*event, boost)
            })
            .collect();
        let n_events = *pick(&mut rng, EVENTS_PER_CASE)?;
        for (event, _) in pool.choose_multiple_weighted(&mut rng, n_events, |(_, w)| *w)? {
            tables.events.push(EventRow {
                case_id: case_id.clone(),
                event_pt: event.to_string(),
            });
        }
    }

    Ok(tables)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Generate and persist `raw/{cases,drugs,events}.csv`.
#[instrument(skip(settings))]
pub fn generate(settings: &Settings) -> Result<SyntheticTables> {
    info!(cases = settings.n_cases, seed = settings.seed, "generating synthetic cases");
    let tables = synthesise(settings.n_cases, settings.seed)?;

    let raw = settings.raw_dir();
    std::fs::create_dir_all(&raw).context("creating raw dir")?;
    write_rows(&raw.join("cases.csv"), &tables.cases)?;
    write_rows(&raw.join("drugs.csv"), &tables.drugs)?;
    write_rows(&raw.join("events.csv"), &tables.events)?;

    info!(
        cases = tables.cases.len(),
        drugs = tables.drugs.len(),
        events = tables.events.len(),
        methadone_qt = tables.co_reported(FOCUS_DRUG, "QT prolongation"),
        "data generation complete"
    );
    Ok(tables)
}
