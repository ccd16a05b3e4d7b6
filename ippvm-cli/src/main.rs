//! ippvm: run an IPPcode22 program.
//!
//! Exit codes:
//! - 0: Success, or the operand of `EXIT`
//! - 10-12: Command line and file errors
//! - 32, 52: Malformed program, semantic error
//! - 53-58: Runtime errors
//! - 99: Internal error
//!
//! Set `IPPVM_LOG` (e.g. `IPPVM_LOG=debug`) to trace a run on stderr.

mod cli;
mod commands;

use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("IPPVM_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let result = cli::parse(std::env::args_os()).and_then(|config| commands::run(&config));

    if let Err(code) = result {
        process::exit(code);
    }
}
