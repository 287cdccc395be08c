use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;

use refdash::source::load_dataset;
use refdash::{Dataset, DatasetShapeError};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

fn minimal(matches: serde_json::Value) -> serde_json::Value {
    json!({
        "matches": matches,
        "referees": {},
        "all_referees": [],
        "all_series": [],
        "all_arenas": []
    })
}

#[test]
fn fixture_ingests_with_defaults() {
    let dataset = Dataset::from_json_str(&read_fixture("referees.json")).expect("fixture should parse");
    assert_eq!(dataset.matches.len(), 6);
    assert_eq!(dataset.referees.len(), 3);
    assert_eq!(dataset.all_referees, vec!["Jones", "Lee", "Smith"]);
    assert_eq!(dataset.date_min.as_deref(), Some("2024-01-05"));
    assert_eq!(dataset.date_max.as_deref(), Some("2024-03-15"));

    let m4 = &dataset.matches[3];
    assert_eq!(m4.match_id, "m4");
    assert_eq!(m4.date, None);
    assert_eq!(m4.date_raw, "");
    assert_eq!(m4.time.as_deref(), Some("18:00"));
    assert_eq!(m4.url, None);

    let m5 = &dataset.matches[4];
    assert_eq!(m5.date_raw, "not a date");
    assert_eq!(m5.date, None);

    let m6 = &dataset.matches[5];
    assert_eq!(m6.match_id, "6");
    assert_eq!(m6.date, NaiveDate::from_ymd_opt(2024, 3, 15));
}

#[test]
fn referee_records_accept_both_partner_spellings() {
    let dataset = Dataset::from_json_str(&read_fixture("referees.json")).expect("fixture should parse");
    let smith = dataset.referee("Smith").expect("smith exists");
    assert_eq!(smith.total_matches, 40);
    assert_eq!(smith.top_partners[0].coreferee, "Jones");
    assert_eq!(smith.matches[0].match_id, "6");
    assert_eq!(smith.matches[2].time.as_deref(), Some("9:30"));

    let jones = dataset.referee("Jones").expect("jones exists");
    assert_eq!(jones.top_partners[0].coreferee, "Smith");
    assert_eq!(jones.top_partners[0].together_matches, 2);

    let lee = dataset.referee("Lee").expect("lee exists");
    assert!(lee.top_partners.is_empty());
    assert!(lee.series_distribution.is_empty());
    assert_eq!(dataset.total_matches_for("Nobody"), 0);
}

#[test]
fn sparse_match_records_are_not_errors() {
    let raw = minimal(json!([
        {"match_id": "a"},
        {"match_id": "b", "referees": "Smith", "date": 20240101, "series": null}
    ]));
    let dataset = Dataset::from_value(&raw).expect("sparse records should ingest");
    let a = &dataset.matches[0];
    assert_eq!(a.series, "");
    assert_eq!(a.arena, "");
    assert_eq!(a.home, "");
    assert!(a.referees.is_empty());
    assert_eq!(a.date, None);
    let b = &dataset.matches[1];
    assert!(b.referees.is_empty());
    assert_eq!(b.date, None);
}

#[test]
fn missing_collections_fail_fast() {
    let mut raw = minimal(json!([]));
    raw.as_object_mut().unwrap().remove("all_series");
    assert_eq!(
        Dataset::from_value(&raw),
        Err(DatasetShapeError::MissingCollection("all_series"))
    );

    let raw = json!({"referees": {}, "all_referees": [], "all_series": [], "all_arenas": []});
    assert_eq!(
        Dataset::from_value(&raw),
        Err(DatasetShapeError::MissingCollection("matches"))
    );

    let mut raw = minimal(json!([]));
    raw["referees"] = json!([]);
    assert!(matches!(
        Dataset::from_value(&raw),
        Err(DatasetShapeError::WrongCollectionType { field: "referees", .. })
    ));

    assert_eq!(
        Dataset::from_value(&json!([1, 2])),
        Err(DatasetShapeError::NotAnObject)
    );
    assert!(matches!(
        Dataset::from_json_str("{not json"),
        Err(DatasetShapeError::InvalidJson(_))
    ));
}

#[test]
fn structural_match_problems_fail_fast() {
    assert_eq!(
        Dataset::from_value(&minimal(json!([{"match_id": "a"}, "oops"]))),
        Err(DatasetShapeError::MatchNotAnObject { index: 1 })
    );
    assert_eq!(
        Dataset::from_value(&minimal(json!([{"date": "2024-01-01"}]))),
        Err(DatasetShapeError::MissingMatchId { index: 0 })
    );
    assert_eq!(
        Dataset::from_value(&minimal(json!([{"match_id": "a"}, {"match_id": "a"}]))),
        Err(DatasetShapeError::DuplicateMatchId("a".to_string()))
    );

    let mut raw = minimal(json!([]));
    raw["referees"] = json!({"Smith": 12});
    assert_eq!(
        Dataset::from_value(&raw),
        Err(DatasetShapeError::RefereeNotAnObject("Smith".to_string()))
    );
}

#[test]
fn load_dataset_reads_local_files_and_keeps_shape_errors() {
    let path = fixture_path("referees.json");
    let dataset = load_dataset(path.to_str().unwrap(), 5).expect("fixture should load");
    assert_eq!(dataset.matches.len(), 6);

    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, r#"{"matches": []}"#).unwrap();
    let err = load_dataset(broken.to_str().unwrap(), 5).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DatasetShapeError>(),
        Some(&DatasetShapeError::MissingCollection("referees"))
    );

    assert!(load_dataset(dir.path().join("missing.json").to_str().unwrap(), 5).is_err());
}
