use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::dataset::{
    ArenaCount, Dataset, Match, PartnerCount, RefereeMatch, RefereeRecord, SeriesCount, TeamCount,
};

const REFEREES: &[&str] = &[
    "Anna Berg",
    "Erik Lund",
    "Sara Holm",
    "Jonas Ek",
    "Maria Nyberg",
    "Oskar Dahl",
    "Lina Sjo",
    "Karl Strand",
];
const SERIES: &[&str] = &["Premier", "Division 1", "Division 2", "Junior", "Cup"];
const ARENAS: &[&str] = &["North Hall", "Harbour Arena", "Old Gym", "City Dome"];
const TEAMS: &[&str] = &[
    "Falcons", "Wolves", "Sharks", "Titans", "Comets", "Rovers", "Pirates", "Bears",
];
const TOP_N: usize = 10;

/// Internally consistent random dataset. The same seed always yields the same
/// dataset.
pub fn generate(match_count: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let Some(start) = NaiveDate::from_ymd_opt(2023, 8, 1) else {
        return Dataset::default();
    };

    let mut matches = Vec::with_capacity(match_count);
    let mut times: HashMap<String, String> = HashMap::new();
    for idx in 0..match_count {
        let date = start + Duration::days(rng.gen_range(0..365));
        let mut teams = TEAMS.choose_multiple(&mut rng, 2);
        let home = teams.next().copied().unwrap_or("Home");
        let away = teams.next().copied().unwrap_or("Away");
        let crew = rng.gen_range(1..=2);
        let referees: Vec<String> = REFEREES
            .choose_multiple(&mut rng, crew)
            .map(|r| r.to_string())
            .collect();
        let match_id = format!("m{:05}", idx + 1);
        // Some matches are undated; kickoff times live only on referee entries.
        let dated = rng.gen_bool(0.95);
        if rng.gen_bool(0.9) {
            times.insert(
                match_id.clone(),
                format!("{:02}:{:02}", rng.gen_range(9..22), rng.gen_range(0..4) * 15),
            );
        }
        matches.push(Match {
            match_id: match_id.clone(),
            date_raw: if dated {
                date.format("%Y-%m-%d").to_string()
            } else {
                String::new()
            },
            date: dated.then_some(date),
            time: None,
            series: SERIES.choose(&mut rng).copied().unwrap_or_default().to_string(),
            arena: ARENAS.choose(&mut rng).copied().unwrap_or_default().to_string(),
            home: home.to_string(),
            away: away.to_string(),
            referees,
            url: Some(format!("https://results.example.org/match/{match_id}")),
        });
    }

    let referees = REFEREES
        .iter()
        .map(|name| (name.to_string(), build_record(name, &matches, &times)))
        .collect();
    let date_min = matches.iter().filter_map(|m| m.date).min();
    let date_max = matches.iter().filter_map(|m| m.date).max();

    Dataset {
        referees,
        all_referees: REFEREES.iter().map(|s| s.to_string()).collect(),
        all_series: SERIES.iter().map(|s| s.to_string()).collect(),
        all_arenas: ARENAS.iter().map(|s| s.to_string()).collect(),
        date_min: date_min.map(|d| d.format("%Y-%m-%d").to_string()),
        date_max: date_max.map(|d| d.format("%Y-%m-%d").to_string()),
        matches,
    }
}

fn build_record(name: &str, matches: &[Match], times: &HashMap<String, String>) -> RefereeRecord {
    let own: Vec<&Match> = matches.iter().filter(|m| m.has_referee(name)).collect();

    let mut partners: Vec<(String, u32)> = Vec::new();
    let mut teams: Vec<(String, u32)> = Vec::new();
    let mut arenas: Vec<(String, u32)> = Vec::new();
    let mut series: Vec<(String, u32)> = Vec::new();
    for m in &own {
        for partner in m.referees.iter().filter(|r| r.as_str() != name) {
            bump(&mut partners, partner);
        }
        bump(&mut teams, &m.home);
        bump(&mut teams, &m.away);
        bump(&mut arenas, &m.arena);
        bump(&mut series, &m.series);
    }

    RefereeRecord {
        total_matches: own.len() as u32,
        matches: own
            .iter()
            .map(|m| RefereeMatch {
                match_id: m.match_id.clone(),
                date_raw: m.date_raw.clone(),
                date: m.date,
                time: times.get(&m.match_id).cloned(),
                home: m.home.clone(),
                away: m.away.clone(),
                series: m.series.clone(),
                arena: m.arena.clone(),
            })
            .collect(),
        top_partners: top(partners)
            .map(|(coreferee, together_matches)| PartnerCount {
                coreferee,
                together_matches,
            })
            .collect(),
        top_teams: top(teams)
            .map(|(team, matches)| TeamCount { team, matches })
            .collect(),
        top_arenas: top(arenas)
            .map(|(arena, matches)| ArenaCount { arena, matches })
            .collect(),
        series_distribution: top(series)
            .map(|(series, matches)| SeriesCount { series, matches })
            .collect(),
    }
}

fn bump(counts: &mut Vec<(String, u32)>, key: &str) {
    match counts.iter_mut().find(|(k, _)| k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key.to_string(), 1)),
    }
}

fn top(mut counts: Vec<(String, u32)>) -> impl Iterator<Item = (String, u32)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.into_iter().take(TOP_N)
}
