//! Errors for decoding textual program elements.

use crate::exit_code::ExitCode;
use crate::type_tag::TypeTag;
use thiserror::Error;

/// Errors that occur while decoding opcodes, type names, variable
/// references and label tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opcode name not recognized.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// Type name not recognized.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Variable reference without a valid `GF@`/`LF@`/`TF@` prefix or name.
    #[error("invalid variable reference '{0}'")]
    InvalidVariable(String),

    /// The same label is declared by two `LABEL` instructions.
    #[error("label '{label}' redefined at position {position}")]
    DuplicateLabel { label: String, position: usize },
}

impl DecodeError {
    /// Exit code for a run that failed with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            DecodeError::DuplicateLabel { .. } => ExitCode::Semantic,
            _ => ExitCode::MalformedProgram,
        }
    }
}

/// A literal whose text does not convert to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value '{text}' can't be converted to {tag}")]
pub struct LiteralError {
    /// The declared type.
    pub tag: TypeTag,
    /// The offending text.
    pub text: String,
}
