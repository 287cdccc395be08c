use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::DatasetShapeError;

/// Label used wherever a grouping key is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub match_id: String,
    /// Date as it appeared in the document; kept for display and export.
    pub date_raw: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub series: String,
    pub arena: String,
    pub home: String,
    pub away: String,
    pub referees: Vec<String>,
    pub url: Option<String>,
}

impl Match {
    pub fn has_referee(&self, name: &str) -> bool {
        self.referees.iter().any(|r| r == name)
    }
}

/// A match as listed inside a referee's own record. The `time` here is
/// referee specific and wins over anything on the global match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefereeMatch {
    pub match_id: String,
    pub date_raw: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub home: String,
    pub away: String,
    pub series: String,
    pub arena: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerCount {
    pub coreferee: String,
    pub together_matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCount {
    pub team: String,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaCount {
    pub arena: String,
    pub matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCount {
    pub series: String,
    pub matches: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefereeRecord {
    pub total_matches: u32,
    pub matches: Vec<RefereeMatch>,
    pub top_partners: Vec<PartnerCount>,
    pub top_teams: Vec<TeamCount>,
    pub top_arenas: Vec<ArenaCount>,
    pub series_distribution: Vec<SeriesCount>,
}

/// Immutable snapshot of one loaded document. Reloading means building a new
/// `Dataset` and dropping the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub matches: Vec<Match>,
    pub referees: HashMap<String, RefereeRecord>,
    pub all_referees: Vec<String>,
    pub all_series: Vec<String>,
    pub all_arenas: Vec<String>,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
}

impl Dataset {
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetShapeError> {
        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|err| DatasetShapeError::InvalidJson(err.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, DatasetShapeError> {
        let root = value.as_object().ok_or(DatasetShapeError::NotAnObject)?;

        let raw_matches = required_array(root, "matches")?;
        let raw_referees = match root.get("referees") {
            None | Some(Value::Null) => return Err(DatasetShapeError::MissingCollection("referees")),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(DatasetShapeError::WrongCollectionType {
                    field: "referees",
                    expected: "an object",
                });
            }
        };
        let all_referees = string_list(required_array(root, "all_referees")?);
        let all_series = string_list(required_array(root, "all_series")?);
        let all_arenas = string_list(required_array(root, "all_arenas")?);

        let mut seen = HashSet::new();
        let mut matches = Vec::with_capacity(raw_matches.len());
        for (index, item) in raw_matches.iter().enumerate() {
            let m = parse_match(index, item)?;
            if !seen.insert(m.match_id.clone()) {
                return Err(DatasetShapeError::DuplicateMatchId(m.match_id));
            }
            matches.push(m);
        }

        let mut referees = HashMap::with_capacity(raw_referees.len());
        for (name, item) in raw_referees {
            let record = parse_referee_record(name, item)?;
            referees.insert(name.clone(), record);
        }

        log::debug!(
            "ingested dataset: {} matches, {} referee records",
            matches.len(),
            referees.len()
        );

        Ok(Self {
            matches,
            referees,
            all_referees,
            all_series,
            all_arenas,
            date_min: opt_str(root, "date_min"),
            date_max: opt_str(root, "date_max"),
        })
    }

    pub fn referee(&self, name: &str) -> Option<&RefereeRecord> {
        self.referees.get(name)
    }

    pub fn total_matches_for(&self, name: &str) -> u32 {
        self.referee(name).map(|r| r.total_matches).unwrap_or(0)
    }
}

/// Parse a calendar date from the formats the exporters are known to emit.
/// Anything else is treated as "no date".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Hour of a clock string, only when it starts with a strict `HH:MM`.
pub fn parse_hour(time: &str) -> Option<u32> {
    let b = time.as_bytes();
    if b.len() < 5
        || !b[0].is_ascii_digit()
        || !b[1].is_ascii_digit()
        || b[2] != b':'
        || !b[3].is_ascii_digit()
        || !b[4].is_ascii_digit()
    {
        return None;
    }
    let hour = u32::from(b[0] - b'0') * 10 + u32::from(b[1] - b'0');
    (hour < 24).then_some(hour)
}

fn required_array<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Vec<Value>, DatasetShapeError> {
    match root.get(field) {
        None | Some(Value::Null) => Err(DatasetShapeError::MissingCollection(field)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(DatasetShapeError::WrongCollectionType {
            field,
            expected: "an array",
        }),
    }
}

fn parse_match(index: usize, item: &Value) -> Result<Match, DatasetShapeError> {
    let obj = item
        .as_object()
        .ok_or(DatasetShapeError::MatchNotAnObject { index })?;
    let match_id = obj
        .get("match_id")
        .and_then(id_string)
        .ok_or(DatasetShapeError::MissingMatchId { index })?;
    let date_raw = str_or_empty(obj, "date");
    let date = parse_date(&date_raw);

    Ok(Match {
        match_id,
        date,
        date_raw,
        time: opt_str(obj, "time"),
        series: str_or_empty(obj, "series"),
        arena: str_or_empty(obj, "arena"),
        home: str_or_empty(obj, "home"),
        away: str_or_empty(obj, "away"),
        referees: obj
            .get("referees")
            .and_then(|v| v.as_array())
            .map(|items| string_list(items))
            .unwrap_or_default(),
        url: opt_str(obj, "url"),
    })
}

fn parse_referee_record(name: &str, item: &Value) -> Result<RefereeRecord, DatasetShapeError> {
    let obj = item
        .as_object()
        .ok_or_else(|| DatasetShapeError::RefereeNotAnObject(name.to_string()))?;

    let matches = objects(obj, "matches")
        .filter_map(|m| {
            let match_id = m.get("match_id").and_then(id_string)?;
            let date_raw = str_or_empty(m, "date");
            Some(RefereeMatch {
                match_id,
                date: parse_date(&date_raw),
                date_raw,
                time: opt_str(m, "time"),
                home: str_or_empty(m, "home"),
                away: str_or_empty(m, "away"),
                series: str_or_empty(m, "series"),
                arena: str_or_empty(m, "arena"),
            })
        })
        .collect();

    let top_partners = objects(obj, "top_partners")
        .map(|p| PartnerCount {
            coreferee: opt_str(p, "coreferees")
                .or_else(|| opt_str(p, "coreferee"))
                .unwrap_or_default(),
            together_matches: count(p, "together_matches"),
        })
        .collect();
    let top_teams = objects(obj, "top_teams")
        .map(|t| TeamCount {
            team: str_or_empty(t, "team"),
            matches: count(t, "matches"),
        })
        .collect();
    let top_arenas = objects(obj, "top_arenas")
        .map(|a| ArenaCount {
            arena: str_or_empty(a, "arena"),
            matches: count(a, "matches"),
        })
        .collect();
    let series_distribution = objects(obj, "series_distribution")
        .map(|s| SeriesCount {
            series: str_or_empty(s, "series"),
            matches: count(s, "matches"),
        })
        .collect();

    Ok(RefereeRecord {
        total_matches: count(obj, "total_matches"),
        matches,
        top_partners,
        top_teams,
        top_arenas,
        series_distribution,
    })
}

fn objects<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_object())
}

fn string_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect()
}

fn id_string(v: &Value) -> Option<String> {
    let id = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn opt_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn str_or_empty(obj: &Map<String, Value>, key: &str) -> String {
    opt_str(obj, key).unwrap_or_default()
}

fn count(obj: &Map<String, Value>, key: &str) -> u32 {
    let Some(v) = obj.get(key) else {
        return 0;
    };
    let n = v
        .as_u64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
        .unwrap_or(0);
    u32::try_from(n).unwrap_or(u32::MAX)
}
