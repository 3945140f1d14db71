//! Connection endpoint descriptor.

use super::ProbeError;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use url::Url;

const SCHEME_SEPARATOR: &str = "://";
const SUPPORTED_SCHEMES: [&str; 2] = ["postgres", "postgresql"];

/// A resolved connection target.
///
/// Holds the descriptor exactly as it was supplied alongside the options parsed from it.
/// Parsing never touches the network.
#[derive(Debug, Clone)]
pub struct Endpoint {
    raw: String,
    options: PgConnectOptions,
}

impl Endpoint {
    /// Validate a connection URI.
    ///
    /// `dialect+driver` schemes such as `postgresql+psycopg2://` are accepted; the driver
    /// suffix is dropped before the URI reaches the client library.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ProbeError> {
        let raw = raw.into();
        let normalized = normalize_scheme(&raw)?;
        let options = PgConnectOptions::from_str(&normalized).map_err(ProbeError::InvalidUri)?;
        Ok(Self { raw, options })
    }

    /// The descriptor, verbatim.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn connect_options(&self) -> &PgConnectOptions {
        &self.options
    }

    pub fn host(&self) -> &str {
        self.options.get_host()
    }

    pub fn port(&self) -> u16 {
        self.options.get_port()
    }

    pub fn database(&self) -> Option<&str> {
        self.options.get_database()
    }

    /// The descriptor with its password masked, for logs and error messages.
    pub fn redacted(&self) -> String {
        match Url::parse(&self.raw) {
            Ok(mut url) => {
                if url.password().is_some() {
                    // Only fails for cannot-be-a-base URLs, which never carry a password.
                    let _ = url.set_password(Some("***"));
                }
                url.to_string()
            }
            Err(_) => format!("{}:{}", self.host(), self.port()),
        }
    }
}

fn normalize_scheme(raw: &str) -> Result<String, ProbeError> {
    let (scheme, rest) = raw
        .split_once(SCHEME_SEPARATOR)
        .ok_or(ProbeError::MissingScheme)?;

    let base = scheme.split_once('+').map_or(scheme, |(base, _driver)| base);
    let base = base.to_ascii_lowercase();
    if !SUPPORTED_SCHEMES.contains(&base.as_str()) {
        return Err(ProbeError::UnsupportedScheme {
            scheme: scheme.to_owned(),
        });
    }

    Ok(format!("{base}{SCHEME_SEPARATOR}{rest}"))
}
