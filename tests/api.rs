mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use std::{collections::BTreeSet, fs};

use pv_signal_lab::{
    api,
    config::Settings,
    data,
    signals::{self, classify::Watchlist, EngineConfig},
};
use serde_json::Value;
use tower::ServiceExt;

fn seeded_settings(root: &std::path::Path) -> Settings {
    let settings = Settings::rooted_at(root).unwrap();
    common::write_reference_table(&settings.clean_table_path());
    let config = EngineConfig::new(Watchlist::new(["Y"]));
    signals::compute_file(&settings.clean_table_path(), &settings.tables_dir(), &config)
        .unwrap();
    settings
}

async fn get_json(settings: &Settings, uri: &str) -> (StatusCode, Value) {
    let response = api::router(settings.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn signals_keep_persisted_order_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let settings = seeded_settings(dir.path());

    let (status, all) = get_json(&settings, "/signals").await;
    assert_eq!(status, StatusCode::OK);
    let pairs: Vec<String> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            format!(
                "{}+{}",
                r["drug_name"].as_str().unwrap(),
                r["event_pt"].as_str().unwrap()
            )
        })
        .collect();
    assert_eq!(pairs, vec!["X+Y", "W+Y", "W+Z", "X+Z"]);

    let (_, watchlist) = get_json(&settings, "/signals?watchlist_only=true").await;
    assert_eq!(watchlist.as_array().unwrap().len(), 2);

    let (_, busy) = get_json(&settings, "/signals?min_a=10&drug=W").await;
    let busy = busy.as_array().unwrap();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0]["a"], 75);
    assert_eq!(busy[0]["signal_flag"], false);
}

#[tokio::test]
async fn summary_counts() {
    let dir = tempfile::tempdir().unwrap();
    let settings = seeded_settings(dir.path());

    let (status, summary) = get_json(&settings, "/signals/summary").await;
    assert_eq!(status, StatusCode::OK);
    insta::with_settings!({ sort_maps => true }, {
        insta::assert_json_snapshot!(summary, @r###"
        {
          "case_rows": 100,
          "methadone_cases": 0,
          "reported_pairs": 4,
          "signals": 1,
          "total_cases": 100
        }
        "###);
    });
}

#[tokio::test]
async fn case_lookup_lists_supporting_cases() {
    let dir = tempfile::tempdir().unwrap();
    let settings = seeded_settings(dir.path());

    let (status, body) = get_json(&settings, "/cases/X/Y").await;
    assert_eq!(status, StatusCode::OK);
    let ids = body["case_ids"].as_array().unwrap();
    assert_eq!(ids.len(), 10);
    assert_eq!(ids[0], "CASE-0001");

    let (status, _) = get_json(&settings, "/cases/X/Nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_outputs_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::rooted_at(dir.path()).unwrap();

    for uri in ["/signals", "/signals/summary", "/cases", "/cases/CASE-0001"] {
        let (status, _) = get_json(&settings, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn case_list_is_sorted_and_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let settings = seeded_settings(dir.path());

    let (status, body) = get_json(&settings, "/cases").await;
    assert_eq!(status, StatusCode::OK);
    let ids = body.as_array().unwrap();
    assert_eq!(ids.len(), 100);
    assert_eq!(ids[0], "CASE-0001");
    assert_eq!(ids[99], "CASE-0100");
}

#[tokio::test]
async fn case_detail_deduplicates_drugs_and_events() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::rooted_at(dir.path()).unwrap();
    let path = settings.clean_table_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            common::CLEAN_HEADER,
            "C1,2024,61,M,Pharmacist,Yes,Methadone,PS,Opioid dependence,QT prolongation",
            "C1,2024,61,M,Pharmacist,Yes,Methadone,PS,Opioid dependence,Sedation",
            "C1,2024,61,M,Pharmacist,Yes,Morphine,SS,Pain management,QT prolongation",
            "C1,2024,61,M,Pharmacist,Yes,Morphine,SS,Pain management,Sedation",
            "C2,2024,40,F,Consumer,No,Oxycodone,PS,Pain management,Rash",
        ),
    )
    .unwrap();

    let (status, body) = get_json(&settings, "/cases/C1").await;
    assert_eq!(status, StatusCode::OK);
    insta::with_settings!({ sort_maps => true }, {
        insta::assert_json_snapshot!(body, @r###"
        {
          "case_id": "C1",
          "demographics": {
            "age": 61,
            "report_year": 2024,
            "reporter_type": "Pharmacist",
            "serious": "Yes",
            "sex": "M"
          },
          "drugs": [
            {
              "drug_name": "Methadone",
              "indication": "Opioid dependence",
              "role_cod": "PS"
            },
            {
              "drug_name": "Morphine",
              "indication": "Pain management",
              "role_cod": "SS"
            }
          ],
          "events": [
            "QT prolongation",
            "Sedation"
          ]
        }
        "###);
    });

    let (status, _) = get_json(&settings, "/cases/C9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_counts_methadone_cases() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::rooted_at(dir.path()).unwrap();
    settings.n_cases = 400;
    data::synth::generate(&settings).unwrap();
    data::clean::clean(&settings).unwrap();
    signals::compute(&settings).unwrap();

    let expected = data::clean::read_clean_table(&settings.clean_table_path())
        .unwrap()
        .into_iter()
        .filter(|r| r.drug_name == data::synth::FOCUS_DRUG)
        .map(|r| r.case_id)
        .collect::<BTreeSet<_>>()
        .len();
    assert!(expected > 0);

    let (status, summary) = get_json(&settings, "/signals/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["methadone_cases"], expected);
}
