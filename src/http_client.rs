use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared client. The timeout of the first call wins for the process.
pub fn http_client(timeout_secs: Option<u64>) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1);
        Client::builder()
            .timeout(Duration::from_secs(secs))
            .user_agent(concat!("refdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")
    })
}
