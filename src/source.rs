use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::dataset::Dataset;
use crate::http_client::http_client;

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load and ingest the dataset document. Shape errors stay downcastable to
/// `DatasetShapeError`.
pub fn load_dataset(location: &str, timeout_secs: u64) -> Result<Dataset> {
    let location = location.trim();
    let raw = if is_remote(location) {
        fetch_remote(location, timeout_secs)?
    } else {
        read_local(Path::new(location))?
    };
    let dataset =
        Dataset::from_json_str(&raw).with_context(|| format!("invalid dataset at {location}"))?;
    log::info!(
        "loaded {} matches and {} referees from {location}",
        dataset.matches.len(),
        dataset.referees.len()
    );
    Ok(dataset)
}

fn read_local(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read dataset {}", path.display()))
}

fn fetch_remote(url: &str, timeout_secs: u64) -> Result<String> {
    let client = http_client(Some(timeout_secs))?;
    let resp = client.get(url).send().context("dataset request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("dataset request to {url} returned {status}"));
    }
    resp.text().context("read dataset body")
}
