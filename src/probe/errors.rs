//! Error types for the connectivity probe.

use std::fmt;

/// Which stage of the probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connection,
    Query,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Connection => "connection",
            ErrorKind::Query => "query",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("unsupported connection URI scheme {scheme:?} (expected postgres or postgresql)")]
    UnsupportedScheme { scheme: String },
    #[error("connection URI has no scheme")]
    MissingScheme,
    #[error("invalid connection URI")]
    InvalidUri(#[source] sqlx::Error),
    #[error("failed to connect to {target}")]
    Connection {
        target: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("query `{statement}` failed")]
    Query {
        statement: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl ProbeError {
    /// Classify a failure raised while establishing the connection.
    ///
    /// The client library reports some URI problems (bad `sslmode`, unreadable
    /// certificate paths) only when the connection is opened; those stay config errors.
    pub fn connecting(target: impl Into<String>, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::Configuration(_) => ProbeError::InvalidUri(source),
            source => ProbeError::Connection {
                target: target.into(),
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::UnsupportedScheme { .. }
            | ProbeError::MissingScheme
            | ProbeError::InvalidUri(_) => ErrorKind::Config,
            ProbeError::Connection { .. } => ErrorKind::Connection,
            ProbeError::Query { .. } => ErrorKind::Query,
        }
    }
}
