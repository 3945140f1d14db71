use clap::{Parser, ValueEnum};

/// PostgreSQL connectivity probe.
///
/// Resolves the target from `DATABASE_URL`, runs `SELECT version()` over a single
/// connection and prints the result. Takes no arguments for normal use.
#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_SHORT"), ")"))]
pub struct Args {
    /// Log formatter to use (logs are always written to stderr)
    #[arg(long, value_enum, env = "TRACING", default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

const fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}
