use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_STORE_PATH: &str = "folio-local.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// JSON file standing in for the browser's persistent local storage.
    pub store_path: PathBuf,
    pub request_timeout: Duration,
    pub rust_log: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a number, got '{raw}'"))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(ClientConfig {
            api_base_url: lookup("FOLIO_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            store_path: lookup("FOLIO_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            request_timeout: Duration::from_secs(timeout_secs),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}
