use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::filter::{DateRange, FilterState};

const CACHE_DIR: &str = "refdash";
const FILTERS_FILE: &str = "filters.json";
const FILTERS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct FiltersFile {
    version: u32,
    #[serde(default)]
    referee: Option<String>,
    #[serde(default)]
    compare: Vec<String>,
    #[serde(default)]
    series: Vec<String>,
    #[serde(default)]
    arenas: Vec<String>,
    #[serde(default)]
    date_from: Option<NaiveDate>,
    #[serde(default)]
    date_to: Option<NaiveDate>,
}

impl From<&FilterState> for FiltersFile {
    fn from(state: &FilterState) -> Self {
        Self {
            version: FILTERS_VERSION,
            referee: state.selected_referee().map(str::to_string),
            compare: state.compare_referees.clone(),
            series: state.series.iter().cloned().collect(),
            arenas: state.arenas.iter().cloned().collect(),
            date_from: state.date_range.from,
            date_to: state.date_range.to,
        }
    }
}

impl From<FiltersFile> for FilterState {
    fn from(file: FiltersFile) -> Self {
        FilterState::new()
            .with_referee(file.referee.as_deref())
            .with_compare(file.compare)
            .with_series(file.series)
            .with_arenas(file.arenas)
            .with_date_range(DateRange::new(file.date_from, file.date_to))
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn filters_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(FILTERS_FILE))
}

/// Remembered selections, or the empty state when nothing usable is stored.
/// Partner focus is never restored.
pub fn load_filter_state() -> FilterState {
    filters_path()
        .map(|path| load_filter_state_from(&path))
        .unwrap_or_default()
}

pub fn load_filter_state_from(path: &Path) -> FilterState {
    let Ok(raw) = fs::read_to_string(path) else {
        return FilterState::default();
    };
    let file = match serde_json::from_str::<FiltersFile>(&raw) {
        Ok(file) => file,
        Err(err) => {
            log::warn!("ignoring unreadable filters at {}: {err}", path.display());
            return FilterState::default();
        }
    };
    if file.version != FILTERS_VERSION {
        log::warn!(
            "ignoring filters at {} with version {}",
            path.display(),
            file.version
        );
        return FilterState::default();
    }
    FilterState::from(file)
}

pub fn save_filter_state(state: &FilterState) -> Result<()> {
    let Some(path) = filters_path() else {
        return Ok(());
    };
    save_filter_state_to(&path, state)
}

pub fn save_filter_state_to(path: &Path, state: &FilterState) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&FiltersFile::from(state)).context("serialize filters")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write filters")?;
    fs::rename(&tmp, path).context("swap filters")?;
    log::debug!("saved filters to {}", path.display());
    Ok(())
}
