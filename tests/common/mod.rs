#![allow(dead_code)]

use std::{fs, path::Path};

/// 100 cases: drug X in 20, event Y in 15, X with Y in 10.
///
/// Cases 1-10 report X + Y, 11-20 X + Z, 21-25 W + Y, 26-100 W + Z.
pub fn reference_rows() -> Vec<(String, &'static str, &'static str)> {
    (1..=100)
        .map(|i| {
            let (drug, event) = match i {
                1..=10 => ("X", "Y"),
                11..=20 => ("X", "Z"),
                21..=25 => ("W", "Y"),
                _ => ("W", "Z"),
            };
            (format!("CASE-{i:04}"), drug, event)
        })
        .collect()
}

pub const CLEAN_HEADER: &str =
    "case_id,report_year,age,sex,reporter_type,serious,drug_name,role_cod,indication,event_pt";

/// Rows in the `clean_data.csv` layout with fixed demographics.
pub fn to_csv(rows: &[(String, &str, &str)]) -> String {
    let mut out = format!("{CLEAN_HEADER}\n");
    for (case_id, drug, event) in rows {
        out.push_str(&format!(
            "{case_id},2024,50,F,Physician,No,{drug},PS,Pain management,{event}\n"
        ));
    }
    out
}

pub fn write_reference_table(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, to_csv(&reference_rows())).unwrap();
}
