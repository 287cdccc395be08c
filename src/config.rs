use std::env;

pub const DEFAULT_DATA_LOCATION: &str = "./data.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// File path or http(s) URL of the dataset document.
    pub data_location: String,
    pub http_timeout_secs: u64,
    pub persist_filters: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_location: DEFAULT_DATA_LOCATION.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            persist_filters: true,
        }
    }
}

impl Settings {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_location = lookup("REFDASH_DATA")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or(defaults.data_location);
        let http_timeout_secs = lookup("REFDASH_HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(defaults.http_timeout_secs)
            .max(1);
        let persist_filters = lookup("REFDASH_PERSIST")
            .map(|val| !is_off(&val))
            .unwrap_or(defaults.persist_filters);
        Self {
            data_location,
            http_timeout_secs,
            persist_filters,
        }
    }
}

fn is_off(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
