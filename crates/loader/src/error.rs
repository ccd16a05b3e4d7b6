//! Error types for the IPPcode22 loader.

use ippvm_common::ExitCode;
use thiserror::Error;

/// Errors produced while reading IPPcode22 source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The first non-comment line is not `.IPPcode22`.
    #[error("line {line}: missing or invalid .IPPcode22 header")]
    MissingHeader { line: usize },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode did not have enough arguments.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// An argument does not have the shape its position requires.
    #[error("line {line}: expected {expected}, found '{token}'")]
    InvalidArgument {
        line: usize,
        expected: &'static str,
        token: String,
    },

    /// A token appeared after the last argument.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}

impl LoadError {
    /// Source line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            LoadError::MissingHeader { line }
            | LoadError::UnknownOpcode { line, .. }
            | LoadError::MissingArgument { line, .. }
            | LoadError::InvalidArgument { line, .. }
            | LoadError::UnexpectedToken { line, .. } => *line,
        }
    }

    /// Every load failure is a malformed program.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::MalformedProgram
    }
}
