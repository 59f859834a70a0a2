//! prtally CLI entrypoint for per-team pull request marker reports.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use prtally::{AnalysisError, PrTallyConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

const DEFAULT_LOG_FILTER: &str = "prtally=info";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "error: {error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AnalysisError> {
    let config = load_config()?;
    cli::analyze::run(&config).await
}

/// Installs a stderr log subscriber filtered by `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`AnalysisError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PrTallyConfig, AnalysisError> {
    PrTallyConfig::load().map_err(|error| AnalysisError::Configuration {
        message: error.to_string(),
    })
}
