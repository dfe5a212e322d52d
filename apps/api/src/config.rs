use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// `None` disables contact notifications.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings for contact notifications.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: String,
    /// Upper bound on one notification, connection included.
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .context("Required environment variable 'DATABASE_URL' is not set")?,
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            smtp: SmtpConfig::from_lookup(&lookup)?,
        })
    }

    pub fn notify_timeout(&self) -> Duration {
        self.smtp
            .as_ref()
            .map(|s| s.timeout)
            .unwrap_or(Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS))
    }
}

impl SmtpConfig {
    /// Returns `None` when `SMTP_HOST` is unset.
    ///
    /// | Variable            | Default                 |
    /// |---------------------|-------------------------|
    /// | `SMTP_PORT`         | `587`                   |
    /// | `SMTP_USER`         | none                    |
    /// | `SMTP_PASSWORD`     | none                    |
    /// | `SMTP_FROM`         | `SMTP_USER`             |
    /// | `NOTIFY_TO`         | `SMTP_USER`             |
    /// | `SMTP_TIMEOUT_SECS` | `10`                    |
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(host) = lookup("SMTP_HOST") else {
            return Ok(None);
        };

        let username = lookup("SMTP_USER");
        let from = lookup("SMTP_FROM")
            .or_else(|| username.clone())
            .context("SMTP_FROM or SMTP_USER must be set when SMTP_HOST is set")?;
        let to = lookup("NOTIFY_TO")
            .or_else(|| username.clone())
            .context("NOTIFY_TO or SMTP_USER must be set when SMTP_HOST is set")?;
        let timeout_secs = parse_or(
            "SMTP_TIMEOUT_SECS",
            lookup("SMTP_TIMEOUT_SECS"),
            DEFAULT_SMTP_TIMEOUT_SECS,
        )?;

        Ok(Some(SmtpConfig {
            host,
            port: parse_or("SMTP_PORT", lookup("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            username,
            password: lookup("SMTP_PASSWORD"),
            from,
            to,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}
