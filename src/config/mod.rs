use anyhow::{anyhow, Result};
use std::fmt::Display;
use std::str::FromStr;

const DEFAULT_API_URL: &str = "https://api.airbyte.com/v1";
const DEFAULT_METRICS_PORT: u16 = 8000;
const DEFAULT_UPDATE_INTERVAL_SECONDS: u64 = 30;

/// Complete exporter configuration, sourced from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Airbyte public API base URL (no trailing slash)
    pub api_url: String,
    /// Port the /metrics endpoint listens on
    pub metrics_port: u16,
    /// Seconds between poll cycles
    pub update_interval_seconds: u64,
    /// OAuth application client id
    pub client_id: String,
    /// OAuth application client secret
    pub client_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `AIRBYTE_CLIENT_ID` and `AIRBYTE_CLIENT_SECRET` are required; the
    /// process must not start without them. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        let client_id = require_env("AIRBYTE_CLIENT_ID")?;
        let client_secret = require_env("AIRBYTE_CLIENT_SECRET")?;
        let api_url = std::env::var("AIRBYTE_API_URL")
            .map(|raw| normalize_api_url(&raw))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let metrics_port = parse_env("PROMETHEUS_PORT", DEFAULT_METRICS_PORT)?;
        let update_interval_seconds =
            parse_env("METRICS_UPDATE_INTERVAL", DEFAULT_UPDATE_INTERVAL_SECONDS)?;

        Ok(Self {
            api_url,
            metrics_port,
            update_interval_seconds,
            client_id,
            client_secret,
        })
    }

    /// Token endpoint, derived from the API base URL
    pub fn auth_url(&self) -> String {
        format!("{}/applications/token", self.api_url)
    }
}

fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(anyhow!("{name} is not set")),
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {name} {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}
