//! The seam between the probe pipeline and the database client.

use super::{Endpoint, ProbeError, ServerVersion};
use crate::data::version::{VERSION_QUERY, server_version};
use crate::utils::fmt_duration;
use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::{ConnectOptions, Connection};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// `application_name` reported to the server unless overridden.
pub const DEFAULT_APPLICATION_NAME: &str = "dbprobe";

/// Opens sessions against an [`Endpoint`].
#[async_trait]
pub trait Backend: Send + Sync {
    type Session: Session;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Session, ProbeError>;
}

/// One acquired connection.
///
/// Every session handed out by [`Backend::connect`] must be passed to [`Session::release`]
/// before the probe returns.
#[async_trait]
pub trait Session: Send + Sized {
    async fn server_version(&mut self) -> Result<ServerVersion, ProbeError>;

    /// Connections currently held open by this session.
    fn open_connections(&self) -> u32;

    /// Close the session, returning how many of its connections are still open afterwards.
    async fn release(self) -> u32;
}

/// PostgreSQL backend holding exactly one connection per session.
///
/// The connection is opened once. A refused or failed attempt is reported as is,
/// never retried.
#[derive(Debug, Clone)]
pub struct PgBackend {
    connect_timeout: Option<Duration>,
    application_name: String,
}

impl Default for PgBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PgBackend {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self {
            connect_timeout,
            application_name: DEFAULT_APPLICATION_NAME.to_owned(),
        }
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<PgConnection, sqlx::Error> {
        let options = endpoint
            .connect_options()
            .clone()
            .application_name(&self.application_name)
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, options.connect())
                .await
                .map_err(|_| {
                    sqlx::Error::Io(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connection attempt timed out after {}", fmt_duration(timeout)),
                    ))
                })?,
            None => options.connect().await,
        }
    }
}

#[async_trait]
impl Backend for PgBackend {
    type Session = PgSession;

    async fn connect(&self, endpoint: &Endpoint) -> Result<PgSession, ProbeError> {
        let start = Instant::now();
        let conn = self
            .open(endpoint)
            .await
            .map_err(|e| ProbeError::connecting(endpoint.redacted(), e))?;

        debug!(
            host = endpoint.host(),
            port = endpoint.port(),
            duration = fmt_duration(start.elapsed()),
            "connection established"
        );
        Ok(PgSession {
            conn,
            target: endpoint.redacted(),
        })
    }
}

pub struct PgSession {
    conn: PgConnection,
    target: String,
}

#[async_trait]
impl Session for PgSession {
    async fn server_version(&mut self) -> Result<ServerVersion, ProbeError> {
        let start = Instant::now();

        // Liveness check before the statement, so a dead connection surfaces as such.
        self.conn
            .ping()
            .await
            .map_err(|e| ProbeError::connecting(self.target.as_str(), e))?;

        let version = server_version(&mut self.conn)
            .await
            .map_err(|source| ProbeError::Query {
                statement: VERSION_QUERY,
                source,
            })?;

        debug!(duration = fmt_duration(start.elapsed()), "version query completed");
        Ok(ServerVersion::new(version))
    }

    fn open_connections(&self) -> u32 {
        1
    }

    async fn release(self) -> u32 {
        // The socket is dropped even when the graceful close fails.
        if let Err(e) = self.conn.close().await {
            warn!(error = ?e, "connection did not close cleanly");
        }
        debug!("connection released");
        0
    }
}
