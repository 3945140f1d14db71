//! Pipeline behavior against an in-memory backend.
//!
//! The fake backend records every target it is asked to connect to and tracks how many
//! connections are open, so the tests can see what was attempted and whether it was released.

use async_trait::async_trait;
use dbprobe::config::DEFAULT_DATABASE_URL;
use dbprobe::probe::{
    Backend, Endpoint, ErrorKind, ProbeError, ServerVersion, Session, emit, run_probe,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
enum Outcome {
    Version(&'static str),
    Unreachable,
    QueryRejected,
}

struct FakeBackend {
    outcome: Outcome,
    attempted: Mutex<Vec<String>>,
    open: Arc<AtomicU32>,
}

impl FakeBackend {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            attempted: Mutex::new(Vec::new()),
            open: Arc::new(AtomicU32::new(0)),
        }
    }

    fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    fn open_connections(&self) -> u32 {
        self.open.load(Ordering::SeqCst)
    }
}

struct FakeSession {
    outcome: Outcome,
    open: Arc<AtomicU32>,
}

#[async_trait]
impl Backend for FakeBackend {
    type Session = FakeSession;

    async fn connect(&self, endpoint: &Endpoint) -> Result<FakeSession, ProbeError> {
        self.attempted.lock().unwrap().push(endpoint.as_str().to_owned());
        if let Outcome::Unreachable = self.outcome {
            let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
            return Err(ProbeError::connecting(
                endpoint.redacted(),
                sqlx::Error::Io(refused),
            ));
        }
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            outcome: self.outcome,
            open: self.open.clone(),
        })
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn server_version(&mut self) -> Result<ServerVersion, ProbeError> {
        match self.outcome {
            Outcome::Version(v) => Ok(ServerVersion::new(v)),
            _ => Err(ProbeError::Query {
                statement: "SELECT version()",
                source: sqlx::Error::Protocol("permission denied for function version".into()),
            }),
        }
    }

    fn open_connections(&self) -> u32 {
        self.open.load(Ordering::SeqCst)
    }

    async fn release(self) -> u32 {
        self.open.fetch_sub(1, Ordering::SeqCst) - 1
    }
}

const PG15: &str = "PostgreSQL 15.4 (Debian 15.4-1.pgdg120+1) on x86_64-pc-linux-gnu";

#[tokio::test]
async fn success_yields_version_and_releases_connection() {
    let backend = FakeBackend::new(Outcome::Version(PG15));
    let version = run_probe(&backend, "postgres://probe:pw@localhost:5432/app")
        .await
        .expect("probe should succeed");

    assert_eq!(version.as_str(), PG15);
    assert_eq!(backend.attempted().len(), 1);
    assert_eq!(backend.open_connections(), 0);

    let mut out = Vec::new();
    emit(&mut out, &version).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("DB version: {PG15}\n"));
}

#[tokio::test]
async fn default_target_is_attempted_verbatim() {
    let backend = FakeBackend::new(Outcome::Version(PG15));
    run_probe(&backend, DEFAULT_DATABASE_URL).await.unwrap();

    assert_eq!(backend.attempted(), vec![DEFAULT_DATABASE_URL.to_owned()]);
}

#[tokio::test]
async fn malformed_uri_fails_before_connecting() {
    for descriptor in [
        "not a uri",
        "mysql://root@localhost/app",
        "postgres://probe@localhost:notaport/app",
    ] {
        let backend = FakeBackend::new(Outcome::Version(PG15));
        let err = run_probe(&backend, descriptor).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Config, "{descriptor}");
        assert!(backend.attempted().is_empty(), "{descriptor} reached the backend");
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connection_error() {
    let backend = FakeBackend::new(Outcome::Unreachable);
    let err = run_probe(&backend, "postgres://probe:pw@localhost:1/app")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(backend.open_connections(), 0);
    // The password never makes it into the diagnostic.
    assert!(!err.to_string().contains("pw@"));
}

#[tokio::test]
async fn rejected_query_still_releases_connection() {
    let backend = FakeBackend::new(Outcome::QueryRejected);
    let err = run_probe(&backend, "postgres://probe@localhost/app")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(backend.attempted().len(), 1);
    assert_eq!(backend.open_connections(), 0);
}

#[tokio::test]
async fn release_reports_no_connections_left() {
    let backend = FakeBackend::new(Outcome::Version(PG15));
    let endpoint = Endpoint::parse("postgres://probe@localhost/app").unwrap();

    let session = backend.connect(&endpoint).await.unwrap();
    assert_eq!(session.open_connections(), 1);
    assert_eq!(session.release().await, 0);
    assert_eq!(backend.open_connections(), 0);
}
