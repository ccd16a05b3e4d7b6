//! Verification errors for the IPPcode22 verifier.
//!
//! Every error includes the 1-based position (`at`) of the offending
//! instruction. The verifier collects ALL errors, not just the first.

use ippvm_common::{ArgKind, ExitCode, Opcode, TypeTag};
use thiserror::Error;

/// Errors found during static verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Structural ---
    /// Declared order is zero.
    #[error("instruction {at} has order 0; orders start at 1")]
    ZeroOrder { at: usize },

    /// Declared order does not increase strictly.
    #[error("instruction {at} has order {order}, not greater than previous order {previous}")]
    UnorderedInstruction { at: usize, order: u32, previous: u32 },

    /// Wrong number of arguments for the opcode.
    #[error("{opcode} at instruction {at} takes {expected} argument(s), found {found}")]
    ArgumentCount {
        at: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// An argument has the wrong shape for its position.
    #[error("{opcode} at instruction {at}: argument {position} must be {expected}, found {found}")]
    ArgumentShape {
        at: usize,
        opcode: Opcode,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    // --- Literals ---
    /// A literal's text does not convert to its declared type.
    #[error("value '{text}' can't be converted to {tag} at instruction {at}")]
    InvalidLiteral { at: usize, tag: TypeTag, text: String },

    // --- Labels ---
    /// The same label is declared twice.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// Jump or call to a label that is never declared.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },
}

impl VerifyError {
    /// Position of the offending instruction (1-based).
    pub fn at(&self) -> usize {
        match self {
            VerifyError::ZeroOrder { at }
            | VerifyError::UnorderedInstruction { at, .. }
            | VerifyError::ArgumentCount { at, .. }
            | VerifyError::ArgumentShape { at, .. }
            | VerifyError::InvalidLiteral { at, .. }
            | VerifyError::DuplicateLabel { at, .. }
            | VerifyError::UndefinedLabel { at, .. } => *at,
        }
    }

    /// Exit code for a run rejected with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            VerifyError::DuplicateLabel { .. } | VerifyError::UndefinedLabel { .. } => {
                ExitCode::Semantic
            }
            _ => ExitCode::MalformedProgram,
        }
    }
}

/// Diagnostic name of an expected argument shape.
pub(crate) fn shape_name(kind: ArgKind) -> &'static str {
    match kind {
        ArgKind::Var => "a variable",
        ArgKind::Symb => "a variable or literal",
        ArgKind::Label => "a label",
        ArgKind::Type => "a type",
    }
}
