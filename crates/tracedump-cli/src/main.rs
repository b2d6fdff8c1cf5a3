use std::{env, io, process::ExitCode};

use envconfig::Envconfig;
use tracedump::{Harness, HarnessOutcome, StdReport};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

fn main() -> ExitCode {
    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let harness = Harness::new(config::harness_config(Config::init_from_env(), env::args().nth(1)));

    match harness.run(&mut StdReport) {
        Ok(HarnessOutcome::Imported) => {
            tracing::debug!(module = %harness.config().module, "import succeeded");
        }
        Ok(HarnessOutcome::ImportFailed(outcome)) => {
            tracing::debug!(module = %harness.config().module, ?outcome, "import failed");
        }
        Err(err) => {
            tracing::error!(module = %harness.config().module, error = %err, "harness failed");
        }
    }
    // the exit status never reflects the import result or the configuration
    ExitCode::SUCCESS
}
