use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;

use refdash::filter::referee_options;
use refdash::synthetic;
use refdash::{Dataset, DateRange, FilterState, Match, filter_matches};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture() -> Dataset {
    Dataset::from_json_str(&read_fixture("referees.json")).expect("fixture should parse")
}

fn ids(matches: &[&Match]) -> Vec<String> {
    matches.iter().map(|m| m.match_id.clone()).collect()
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn unfiltered_state_returns_everything_in_order() {
    let dataset = fixture();
    let fs = FilterState::new();
    assert!(fs.is_unfiltered());
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["m1", "m2", "m3", "m4", "m5", "6"]);
}

#[test]
fn partner_focus_requires_both_referees() {
    let raw = json!({
        "matches": [
            {"match_id": "1", "referees": ["Smith", "Jones"]},
            {"match_id": "2", "referees": ["Smith"]},
            {"match_id": "3", "referees": ["Jones"]}
        ],
        "referees": {},
        "all_referees": ["Jones", "Smith"],
        "all_series": [],
        "all_arenas": []
    });
    let dataset = Dataset::from_value(&raw).expect("dataset should parse");
    let fs = FilterState::new()
        .with_referee(Some("Smith"))
        .toggle_partner_focus("Jones");
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["1"]);

    let fs = fs.toggle_partner_focus("Jones");
    assert_eq!(fs.partner_focus, None);
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["1", "2"]);
}

#[test]
fn partner_focus_without_referee_is_ignored() {
    let dataset = fixture();
    let fs = FilterState::new().toggle_partner_focus("Lee");
    assert_eq!(fs.active_partner(), None);
    assert_eq!(filter_matches(&dataset, &fs).len(), dataset.matches.len());
}

#[test]
fn selecting_a_referee_clears_partner_focus() {
    let fs = FilterState::new()
        .with_referee(Some("Smith"))
        .toggle_partner_focus("Jones")
        .with_referee(Some("Jones"));
    assert_eq!(fs.selected_referee(), Some("Jones"));
    assert_eq!(fs.partner_focus, None);

    let fs = fs.with_referee(Some("  "));
    assert_eq!(fs.selected_referee(), None);
}

#[test]
fn undated_matches_only_pass_without_date_bounds() {
    let dataset = fixture();
    let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));
    let fs = FilterState::new().with_date_range(range);
    let kept = ids(&filter_matches(&dataset, &fs));
    assert_eq!(kept, vec!["m1", "m2", "m3", "6"]);
    assert!(!kept.contains(&"m4".to_string()));

    let fs = FilterState::new().with_arenas(["Old Gym"]);
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["m4"]);
}

#[test]
fn date_bounds_are_inclusive_and_independent() {
    let dataset = fixture();
    let exact = FilterState::new().with_date_range(DateRange::new(date(2024, 1, 6), date(2024, 2, 10)));
    assert_eq!(ids(&filter_matches(&dataset, &exact)), vec!["m2", "m3"]);

    let from_only = FilterState::new().with_date_range(DateRange::new(date(2024, 2, 10), None));
    assert_eq!(ids(&filter_matches(&dataset, &from_only)), vec!["m3", "6"]);

    let to_only = FilterState::new().with_date_range(DateRange::new(None, date(2024, 1, 5)));
    assert_eq!(ids(&filter_matches(&dataset, &to_only)), vec!["m1"]);
}

#[test]
fn series_and_arena_sets_combine_with_and() {
    let dataset = fixture();
    let fs = FilterState::new().with_series(["Premier", "Cup"]);
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["m1", "m2", "m5", "6"]);

    let fs = fs.with_arenas(["North Hall"]);
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["m1", "m5"]);

    let fs = fs.with_referee(Some("Smith"));
    assert_eq!(ids(&filter_matches(&dataset, &fs)), vec!["m1"]);
}

#[test]
fn unknown_referee_yields_empty_result() {
    let dataset = fixture();
    let fs = FilterState::new().with_referee(Some("Unknown Person"));
    assert!(filter_matches(&dataset, &fs).is_empty());
}

#[test]
fn empty_dataset_yields_empty_result() {
    let dataset = Dataset::default();
    let fs = FilterState::new().with_series(["Premier"]);
    assert!(filter_matches(&dataset, &fs).is_empty());
}

#[test]
fn filter_agrees_with_per_match_predicate_and_is_repeatable() {
    let dataset = synthetic::generate(400, 99);
    let states = [
        FilterState::new(),
        FilterState::new().with_referee(Some("Anna Berg")),
        FilterState::new()
            .with_referee(Some("Erik Lund"))
            .toggle_partner_focus("Sara Holm"),
        FilterState::new().with_series(["Premier", "Cup"]).with_arenas(["Old Gym"]),
        FilterState::new().with_date_range(DateRange::new(date(2023, 10, 1), date(2024, 2, 29))),
        FilterState::new()
            .with_referee(Some("Maria Nyberg"))
            .with_date_range(DateRange::new(None, date(2023, 12, 31)))
            .with_series(["Junior"]),
    ];
    for fs in &states {
        let first = filter_matches(&dataset, fs);
        let second = filter_matches(&dataset, fs);
        assert_eq!(first, second);

        let expected: Vec<&Match> = dataset.matches.iter().filter(|m| fs.accepts(m)).collect();
        assert_eq!(first, expected);

        for m in &first {
            assert!(fs.date_range.contains(m.date));
            assert!(fs.series.is_empty() || fs.series.contains(&m.series));
            assert!(fs.arenas.is_empty() || fs.arenas.contains(&m.arena));
            if let Some(referee) = fs.selected_referee() {
                assert!(m.has_referee(referee));
            }
            if let Some(partner) = fs.active_partner() {
                assert!(m.has_referee(partner));
            }
        }
    }
}

#[test]
fn referee_options_exclude_selected() {
    let dataset = fixture();
    let fs = FilterState::new().with_referee(Some("Lee"));
    assert_eq!(referee_options(&dataset, &fs), vec!["Jones", "Smith"]);
    assert_eq!(referee_options(&dataset, &FilterState::new()).len(), 3);
}

#[test]
fn cleared_resets_every_field() {
    let fs = FilterState::new()
        .with_referee(Some("Smith"))
        .toggle_partner_focus("Jones")
        .with_compare(["Lee", "Lee", "Jones"])
        .with_series(["Cup"])
        .with_arenas(["Old Gym"])
        .with_date_range(DateRange::new(date(2024, 1, 1), None));
    assert_eq!(fs.compare_referees, vec!["Lee", "Jones"]);
    assert!(!fs.is_unfiltered());
    assert!(fs.cleared().is_unfiltered());
}
