//! Command-line surface: flags, validation, and the stats selection order.

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use ippvm_common::ExitCode;
use ippvm_vm::StatKind;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ippvm",
    version,
    about = "Execute IPPcode22 programs",
    after_help = "At least one of --source and --input must be given; the other is read from stdin."
)]
struct Args {
    /// IPPcode22 source file
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// File that READ takes its lines from
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// File to write the selected statistics to
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Report the number of executed instructions
    #[arg(long, action = ArgAction::Count)]
    insts: u8,

    /// Report the order of the most executed instruction
    #[arg(long, action = ArgAction::Count)]
    hot: u8,

    /// Report the peak number of declared variables
    #[arg(long, action = ArgAction::Count)]
    vars: u8,
}

/// Where statistics go and which counters, in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTarget {
    pub path: PathBuf,
    pub selection: Vec<StatKind>,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source file; `None` reads stdin.
    pub source: Option<PathBuf>,
    /// Input file; `None` reads stdin.
    pub input: Option<PathBuf>,
    pub stats: Option<StatsTarget>,
}

/// Counter flags in the order they appeared on the command line.
///
/// A counted flag only remembers its last position in `ArgMatches`, so the
/// raw arguments are scanned instead. Everything after `--` is positional.
fn selection(argv: &[OsString]) -> Vec<StatKind> {
    argv.iter()
        .skip(1)
        .map_while(|arg| match arg.to_str() {
            Some("--") => None,
            other => Some(other.unwrap_or("")),
        })
        .filter_map(|arg| match arg {
            "--insts" => Some(StatKind::Insts),
            "--hot" => Some(StatKind::Hot),
            "--vars" => Some(StatKind::Vars),
            _ => None,
        })
        .collect()
}

/// Parse and validate `argv`.
///
/// Help and version requests print and exit 0; every other problem prints
/// a diagnostic and returns the missing-argument exit code.
pub fn parse<I, T>(argv: I) -> Result<Config, i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let missing = ExitCode::MissingArgument.code();
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

    let matches = match Args::command().try_get_matches_from(&argv) {
        Ok(matches) => matches,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return Err(ExitCode::Ok.code());
        }
        Err(err) => {
            let _ = err.print();
            return Err(missing);
        }
    };
    let args = Args::from_arg_matches(&matches).map_err(|err| {
        let _ = err.print();
        missing
    })?;
    let selection = selection(&argv);

    if args.source.is_none() && args.input.is_none() {
        eprintln!("ERROR: at least one of --source or --input must be set");
        return Err(missing);
    }

    let stats = match args.stats {
        Some(path) => Some(StatsTarget { path, selection }),
        None if !selection.is_empty() => {
            eprintln!("ERROR: --insts, --hot and --vars require --stats");
            return Err(missing);
        }
        None => None,
    };

    Ok(Config {
        source: args.source,
        input: args.input,
        stats,
    })
}
