//! docshelf walkthrough entry point.
//!
//! # Responsibility
//! - Load configuration from the environment and initialize logging.
//! - Open the configured store, run the fixed walkthrough, close the store.
//!
//! # Exit codes
//! - `0` on success.
//! - `1` when the store cannot be opened, with
//!   `Error connecting to document store: <cause>` on stdout.
//! - `1` as well when a walkthrough step fails after the store was opened.
//!   This departs from the "non-zero only on connection failure" contract on
//!   purpose: a half-finished walkthrough is reported as a failure.
//! - `2` when configuration is invalid.
//!
//! The default endpoint `sqlite://./docshelf-data` expects that directory to
//! exist; set `DOCSHELF_ENDPOINT=memory:` for a run without any setup.

use docshelf_core::{
    core_version, init_logging, run_walkthrough, DocumentRepository, LogConfig, StoreConfig,
};
use log::{error, info, warn};
use std::io::{self, Write};
use std::process::ExitCode;

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let log_config = LogConfig::from_env();
    if let Err(err) = init_logging(&log_config.level, log_config.log_dir.as_deref()) {
        eprintln!("logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ExitCode::from(run(|key| std::env::var(key).ok(), &mut out))
}

/// Runs the whole CLI flow against `out` and returns the process exit code.
fn run<W: Write>(lookup: impl Fn(&str) -> Option<String>, out: &mut W) -> u8 {
    let config = match StoreConfig::from_lookup(lookup) {
        Ok(config) => config,
        Err(err) => {
            error!("event=cli_config module=cli status=error error={err}");
            eprintln!("Invalid configuration: {err}");
            return EXIT_CONFIG;
        }
    };

    let repo = match DocumentRepository::open(&config) {
        Ok(repo) => repo,
        Err(err) => {
            error!("event=cli_connect module=cli status=error error={err}");
            let _ = writeln!(out, "Error connecting to document store: {err}");
            let _ = out.flush();
            return EXIT_FAILURE;
        }
    };

    let outcome = run_walkthrough(&repo, &config.endpoint.to_string(), out);
    let _ = out.flush();

    if let Err(err) = repo.close() {
        warn!("event=cli_close module=cli status=error error={err}");
    }

    match outcome {
        Ok(report) => {
            info!(
                "event=cli_finish module=cli status=ok all_features={} nested_field={}",
                report.all_features_count, report.nested_field_count
            );
            EXIT_OK
        }
        Err(err) => {
            error!("event=cli_finish module=cli status=error error={err}");
            eprintln!("Walkthrough failed: {err}");
            EXIT_FAILURE
        }
    }
}
