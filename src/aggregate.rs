use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::dataset::{
    ArenaCount, Dataset, Match, PartnerCount, RefereeMatch, TeamCount, UNKNOWN_LABEL, parse_hour,
};
use crate::export::{FlatRow, to_export_rows};
use crate::filter::{FilterState, filter_matches};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Common shape fed into every distribution, borrowed from either a
/// referee's own entry or a global match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedMatch<'a> {
    pub match_id: &'a str,
    pub date: Option<NaiveDate>,
    pub time: Option<&'a str>,
    pub home: &'a str,
    pub away: &'a str,
    pub series: &'a str,
    pub arena: &'a str,
}

impl<'a> From<&'a Match> for DerivedMatch<'a> {
    fn from(m: &'a Match) -> Self {
        Self {
            match_id: &m.match_id,
            date: m.date,
            time: m.time.as_deref(),
            home: &m.home,
            away: &m.away,
            series: &m.series,
            arena: &m.arena,
        }
    }
}

impl<'a> From<&'a RefereeMatch> for DerivedMatch<'a> {
    fn from(m: &'a RefereeMatch) -> Self {
        Self {
            match_id: &m.match_id,
            date: m.date,
            time: m.time.as_deref(),
            home: &m.home,
            away: &m.away,
            series: &m.series,
            arena: &m.arena,
        }
    }
}

/// With a known selected referee, their own entries restricted to the
/// filtered ids (in the referee's order). Otherwise the filtered matches.
pub fn derived_matches<'a>(
    dataset: &'a Dataset,
    fs: &FilterState,
    filtered: &[&'a Match],
) -> Vec<DerivedMatch<'a>> {
    let record = fs.selected_referee().and_then(|name| dataset.referee(name));
    let Some(record) = record else {
        return filtered.iter().map(|m| DerivedMatch::from(*m)).collect();
    };
    let allowed: HashMap<&str, &'a Match> =
        filtered.iter().map(|m| (m.match_id.as_str(), *m)).collect();
    record
        .matches
        .iter()
        .filter_map(|entry| {
            let global: &'a Match = allowed.get(entry.match_id.as_str()).copied()?;
            let mut derived = DerivedMatch::from(entry);
            // The referee's own kickoff time wins; the match time fills the gap.
            derived.time = derived.time.or(global.time.as_deref());
            Some(derived)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayCounts {
    /// Index 0 is Sunday, 6 is Saturday.
    pub counts: [u32; 7],
}

impl WeekdayCounts {
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        WEEKDAY_LABELS.iter().copied().zip(self.counts.iter().copied())
    }
}

pub fn weekday_counts(matches: &[DerivedMatch<'_>]) -> WeekdayCounts {
    let mut out = WeekdayCounts::default();
    for date in matches.iter().filter_map(|m| m.date) {
        out.counts[date.weekday().num_days_from_sunday() as usize] += 1;
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourCounts {
    pub counts: [u32; 24],
}

impl HourCounts {
    pub fn label(hour: usize) -> String {
        format!("{hour:02}:00")
    }

    pub fn labels() -> Vec<String> {
        (0..24).map(Self::label).collect()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

pub fn hour_counts(matches: &[DerivedMatch<'_>]) -> HourCounts {
    let mut out = HourCounts::default();
    for hour in matches.iter().filter_map(|m| m.time.and_then(parse_hour)) {
        out.counts[hour as usize] += 1;
    }
    out
}

/// `YYYY-MM` buckets in ascending order; only months that occur are listed.
pub fn monthly_counts(matches: &[DerivedMatch<'_>]) -> Vec<(String, u32)> {
    let mut buckets: BTreeMap<String, u32> = BTreeMap::new();
    for date in matches.iter().filter_map(|m| m.date) {
        let key = format!("{:04}-{:02}", date.year(), date.month());
        *buckets.entry(key).or_insert(0) += 1;
    }
    buckets.into_iter().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Series,
    Arena,
    Home,
    Away,
}

impl GroupKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "series" => Some(Self::Series),
            "arena" => Some(Self::Arena),
            "home" => Some(Self::Home),
            "away" => Some(Self::Away),
            _ => None,
        }
    }

    fn value<'a>(self, m: &DerivedMatch<'a>) -> &'a str {
        match self {
            Self::Series => m.series,
            Self::Arena => m.arena,
            Self::Home => m.home,
            Self::Away => m.away,
        }
    }
}

/// Occurrences per distinct value, most frequent first. Ties keep the order
/// in which the values were first seen.
pub fn count_by(matches: &[DerivedMatch<'_>], key: GroupKey) -> Vec<(String, u32)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(String, u32)> = Vec::new();
    for m in matches {
        let value = key.value(m);
        let label = if value.is_empty() { UNKNOWN_LABEL } else { value };
        match index.get(label) {
            Some(&pos) => out[pos].1 += 1,
            None => {
                index.insert(label, out.len());
                out.push((label.to_string(), 1));
            }
        }
    }
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub referee: String,
    pub total: u32,
}

pub fn comparison_rows(dataset: &Dataset, fs: &FilterState) -> Vec<ComparisonRow> {
    fs.compare_referees
        .iter()
        .map(|name| ComparisonRow {
            referee: name.clone(),
            total: dataset.total_matches_for(name),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefereeProfile<'a> {
    pub name: &'a str,
    pub total_matches: u32,
    pub top_partners: &'a [PartnerCount],
    pub top_teams: &'a [TeamCount],
    pub top_arenas: &'a [ArenaCount],
    pub series_distribution: Vec<(&'a str, u32)>,
}

pub fn referee_profile<'a>(dataset: &'a Dataset, name: &str) -> Option<RefereeProfile<'a>> {
    let (name, record) = dataset.referees.get_key_value(name)?;
    Some(RefereeProfile {
        name,
        total_matches: record.total_matches,
        top_partners: &record.top_partners,
        top_teams: &record.top_teams,
        top_arenas: &record.top_arenas,
        series_distribution: record
            .series_distribution
            .iter()
            .map(|s| {
                let label = if s.series.is_empty() {
                    UNKNOWN_LABEL
                } else {
                    s.series.as_str()
                };
                (label, s.matches)
            })
            .collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub matches_in_view: usize,
    pub selected_referee: Option<String>,
    /// Lifetime total of the selected referee, 0 when they are unknown.
    pub selected_total: Option<u32>,
    pub series_filters: usize,
    pub arena_filters: usize,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
}

pub fn summarize(dataset: &Dataset, fs: &FilterState, filtered: &[&Match]) -> Summary {
    let selected = fs.selected_referee();
    Summary {
        matches_in_view: filtered.len(),
        selected_referee: selected.map(str::to_string),
        selected_total: selected.map(|name| dataset.total_matches_for(name)),
        series_filters: fs.series.len(),
        arena_filters: fs.arenas.len(),
        date_min: dataset.date_min.clone(),
        date_max: dataset.date_max.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow<'a> {
    pub match_id: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub series: &'a str,
    pub arena: &'a str,
    pub home: &'a str,
    pub away: &'a str,
    pub url: Option<&'a str>,
}

/// Date and time come from the selected referee's own entry when it has them.
pub fn table_rows<'a>(
    dataset: &'a Dataset,
    fs: &FilterState,
    filtered: &[&'a Match],
) -> Vec<TableRow<'a>> {
    let own: HashMap<&str, &RefereeMatch> = fs
        .selected_referee()
        .and_then(|name| dataset.referee(name))
        .map(|record| {
            record
                .matches
                .iter()
                .map(|m| (m.match_id.as_str(), m))
                .collect()
        })
        .unwrap_or_default();

    filtered
        .iter()
        .map(|m| {
            let entry = own.get(m.match_id.as_str()).copied();
            let date = entry
                .map(|e| e.date_raw.as_str())
                .filter(|d| !d.is_empty())
                .unwrap_or(&m.date_raw);
            let time = entry
                .and_then(|e| e.time.as_deref())
                .or(m.time.as_deref())
                .unwrap_or("");
            TableRow {
                match_id: &m.match_id,
                date,
                time,
                series: &m.series,
                arena: &m.arena,
                home: &m.home,
                away: &m.away,
                url: m.url.as_deref(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    pub filtered: Vec<&'a Match>,
    pub derived: Vec<DerivedMatch<'a>>,
    pub summary: Summary,
    pub profile: Option<RefereeProfile<'a>>,
    pub weekdays: WeekdayCounts,
    pub hours: HourCounts,
    pub months: Vec<(String, u32)>,
    pub comparison: Vec<ComparisonRow>,
}

impl<'a> Dashboard<'a> {
    pub fn evaluate(dataset: &'a Dataset, fs: &FilterState) -> Self {
        let filtered = filter_matches(dataset, fs);
        let derived = derived_matches(dataset, fs, &filtered);
        let summary = summarize(dataset, fs, &filtered);
        let profile = fs
            .selected_referee()
            .and_then(|name| referee_profile(dataset, name));
        Self {
            weekdays: weekday_counts(&derived),
            hours: hour_counts(&derived),
            months: monthly_counts(&derived),
            comparison: comparison_rows(dataset, fs),
            filtered,
            derived,
            summary,
            profile,
        }
    }

    pub fn export_rows(&self) -> Vec<FlatRow> {
        to_export_rows(&self.filtered)
    }

    pub fn group_by(&self, key: GroupKey) -> Vec<(String, u32)> {
        count_by(&self.derived, key)
    }
}
