//! Runtime configuration, extracted from the process environment.

use anyhow::Context;
use figment::Figment;
use figment::providers::Env;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Target used when `DATABASE_URL` is not set.
///
/// Points at the containerized development database. Kept verbatim, credentials included.
pub const DEFAULT_DATABASE_URL: &str = "postgresql+psycopg2://airbnb:airbnb@db:5432/airbnb";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection URI for the probed database
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Level applied to this crate's logs when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upper bound on connection acquisition; the client library default applies when unset
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub connect_timeout: Option<Duration>,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Extract the configuration from the raw (unprefixed) environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment.extract().context("Failed to load config")
    }
}

/// Accepts fundu duration strings (`"5s"`, `"500ms"`, `"2m"`); bare numbers are seconds.
fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Seconds(secs)) => Ok(Some(Duration::from_secs(secs))),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => fundu::parse_duration(text.trim())
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid duration {text:?}: {e}"))),
    }
}
