use crate::config::Config;
use crate::probe::{self, PgBackend, ProbeError, ServerVersion};
use anyhow::Context;
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

/// Main application struct: resolved configuration plus the backend it probes through.
pub struct App {
    config: Config,
    backend: PgBackend,
}

impl App {
    pub fn new(config: Config) -> Self {
        let backend = PgBackend::new(config.connect_timeout);
        Self { config, backend }
    }

    /// Run the probe once and map the outcome to the process exit status.
    pub async fn run(self) -> ExitCode {
        let outcome = self.probe().await.and_then(|version| {
            probe::emit(&mut io::stdout().lock(), &version)
                .context("Failed to write probe result")
        });

        match outcome {
            Ok(()) => {
                info!("probe succeeded");
                ExitCode::SUCCESS
            }
            Err(e) => {
                let kind = e
                    .downcast_ref::<ProbeError>()
                    .map(|p| p.kind().as_str())
                    .unwrap_or("output");
                error!(kind, error = ?e, "probe failed");
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }

    async fn probe(&self) -> anyhow::Result<ServerVersion> {
        let version = probe::run_probe(&self.backend, &self.config.database_url).await?;
        Ok(version)
    }
}
