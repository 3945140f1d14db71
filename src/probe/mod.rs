//! Connectivity probe.
//!
//! A strictly linear pipeline: resolve the endpoint, acquire one connection, run the
//! version query, emit the result, release the connection. Nothing is retried.

pub mod backend;
pub mod endpoint;
pub mod errors;

pub use backend::{Backend, DEFAULT_APPLICATION_NAME, PgBackend, PgSession, Session};
pub use endpoint::Endpoint;
pub use errors::{ErrorKind, ProbeError};

use std::fmt;
use std::io::{self, Write};
use tracing::{info, warn};

/// Prefix of the single line written on success.
pub const RESULT_LABEL: &str = "DB version: ";

/// Scalar result of the version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion(String);

impl ServerVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run the whole probe against `descriptor`.
///
/// The descriptor is validated before the backend is touched, so a malformed URI never
/// causes a connection attempt. Once a session is open it is released on both the
/// success and the failure path.
pub async fn run_probe<B: Backend>(
    backend: &B,
    descriptor: &str,
) -> Result<ServerVersion, ProbeError> {
    let endpoint = Endpoint::parse(descriptor)?;
    info!(
        target_uri = %endpoint.redacted(),
        database = endpoint.database().unwrap_or_default(),
        "probing database"
    );

    let mut session = backend.connect(&endpoint).await?;
    let result = session.server_version().await;
    let still_open = session.release().await;
    if still_open != 0 {
        warn!(still_open, "connections left open after release");
    }
    result
}

/// Write the result line.
pub fn emit<W: Write>(out: &mut W, version: &ServerVersion) -> io::Result<()> {
    writeln!(out, "{RESULT_LABEL}{version}")?;
    out.flush()
}
