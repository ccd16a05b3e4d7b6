//! The run command: load, verify, execute, report statistics.

use crate::cli::{Config, StatsTarget};
use ippvm_common::{ExitCode, Program};
use ippvm_vm::{Halt, Stats, VM};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

fn read_source(path: Option<&Path>) -> Result<String, i32> {
    let result = match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map(|_| text)
        }
    };
    result.map_err(|e| {
        let name = path.map_or("<stdin>".into(), |p| p.display().to_string());
        eprintln!("ERROR: cannot read '{name}': {e}");
        ExitCode::InputFile.code()
    })
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, i32> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                eprintln!("ERROR: cannot open '{}': {e}", path.display());
                ExitCode::InputFile.code()
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Load and verify a program from source text.
fn prepare(text: &str) -> Result<Program, i32> {
    let program = ippvm_loader::load(text).map_err(|e| {
        eprintln!("ERROR: {e}");
        e.exit_code().code()
    })?;
    debug!(instructions = program.len(), "program loaded");

    if let Err(errors) = ippvm_verifier::verify(&program) {
        for e in &errors {
            eprintln!("ERROR: {e}");
        }
        return Err(errors
            .first()
            .map_or(ExitCode::Internal, |e| e.exit_code())
            .code());
    }
    Ok(program)
}

fn write_stats(target: &StatsTarget, stats: &Stats) -> Result<(), i32> {
    fs::write(&target.path, stats.report(&target.selection)).map_err(|e| {
        eprintln!("ERROR: cannot write '{}': {e}", target.path.display());
        ExitCode::OutputFile.code()
    })
}

/// Load, verify and execute the configured program.
///
/// `Err` carries the process exit status: a diagnostic code, or the
/// non-zero status of an `EXIT` instruction.
pub fn run(config: &Config) -> Result<(), i32> {
    let text = read_source(config.source.as_deref())?;
    let program = prepare(&text)?;
    let input = open_input(config.input.as_deref())?;

    let mut vm = VM::new(&program).with_input(input);
    if config.stats.is_some() {
        vm = vm.with_stats();
    }

    let halt = vm.execute().map_err(|e| {
        eprintln!("ERROR: {e}");
        e.exit_code().code()
    })?;
    info!(status = halt.code(), "program halted");

    if let (Some(target), Some(stats)) = (&config.stats, vm.stats()) {
        write_stats(target, stats)?;
    }

    match halt {
        Halt::Finished | Halt::Exit(0) => Ok(()),
        other => Err(other.code()),
    }
}
