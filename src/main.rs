use clap::Parser;
use edgepin::cli::{self, Cli};
use edgepin::{SyncError, debug};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Settings loading logs through the bridge, so it goes in first
    let rust_log = std::env::var("RUST_LOG").ok();
    debug::init_log_bridge(debug::resolve_level(cli.log_level, rust_log.as_deref(), None));

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("edgepin: error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    debug::set_log_level(debug::resolve_level(
        cli.log_level,
        rust_log.as_deref(),
        settings.log_level,
    ));

    // Runtime the AWS SDK calls are driven on
    let runtime = match Runtime::new() {
        Ok(runtime) => Arc::new(runtime),
        Err(e) => {
            eprintln!("edgepin: error: failed to start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli::run(&cli, &settings, runtime) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("edgepin: error: {e:#}");
            match e.downcast_ref::<SyncError>() {
                Some(SyncError::Conflict(_)) => eprintln!(
                    "edgepin: hint: the distribution changed while updating; \
                     re-run the command to start from fresh remote state"
                ),
                Some(SyncError::Upstream(_)) => eprintln!(
                    "edgepin: hint: check AWS credentials and connectivity, then re-run"
                ),
                _ => {}
            }
            ExitCode::FAILURE
        }
    }
}
