use clap::Parser;
use dbprobe::app::App;
use dbprobe::cli::Args;
use dbprobe::config::Config;
use dbprobe::logging::setup_logging;
use std::process::ExitCode;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config before logging so the configured level applies to every startup log
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_HASH"),
        profile = env!("DBPROBE_BUILD_PROFILE"),
        "starting dbprobe"
    );

    App::new(config).run().await
}
