//! Runtime errors for the IPPcode22 VM.
//!
//! Every error carries the 1-based position (`at`) of the instruction that
//! failed and maps to a process exit code through [`RuntimeError::exit_code`].

use crate::frames::FrameError;
use crate::ops::OpError;
use ippvm_common::{ExitCode, FrameKind, Opcode, TypeTag};
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A literal's text does not convert to its declared type.
    #[error("value '{text}' can't be converted to {tag} at instruction {at}")]
    InvalidLiteral { at: usize, tag: TypeTag, text: String },

    /// An argument is missing or has the wrong shape.
    #[error("malformed {opcode} at instruction {at}: {reason}")]
    MalformedInstruction {
        at: usize,
        opcode: Opcode,
        reason: String,
    },

    /// Two `LABEL` instructions declare the same name.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// Jump or call to a label that is not declared.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// `DEFVAR` of a name that already exists in the frame.
    #[error("variable {var} redefined at instruction {at}")]
    VariableRedefined { at: usize, var: String },

    /// Operand kind outside the operator's accepted set.
    #[error("{opcode} accepts only {accepted} arguments, but {value} is of type {kind} at instruction {at}")]
    BadOperandType {
        at: usize,
        opcode: Opcode,
        value: String,
        kind: TypeTag,
        accepted: String,
    },

    /// Two operands that must share a kind do not.
    #[error("{opcode} can't compare {left} with {right} at instruction {at}")]
    KindMismatch {
        at: usize,
        opcode: Opcode,
        left: TypeTag,
        right: TypeTag,
    },

    /// Variable not declared in the target frame.
    #[error("undefined variable {var} at instruction {at}")]
    UndefinedVariable { at: usize, var: String },

    /// Target frame does not exist.
    #[error("frame {frame} does not exist at instruction {at}")]
    UndefinedFrame { at: usize, frame: FrameKind },

    /// Variable declared but never assigned.
    #[error("variable {var} is uninitialized at instruction {at}")]
    UninitializedVariable { at: usize, var: String },

    /// `RETURN` with no pending `CALL`.
    #[error("RETURN with empty call stack at instruction {at}")]
    EmptyCallStack { at: usize },

    /// Stack instruction with too few operands on the operand stack.
    #[error("{opcode} needs {needed} operand(s) but the stack holds {depth} at instruction {at}")]
    StackUnderflow {
        at: usize,
        opcode: Opcode,
        needed: usize,
        depth: usize,
    },

    /// `IDIV`/`DIV` by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// `EXIT` with a code outside [0, 49].
    #[error("exit code {code} out of range 0-49 at instruction {at}")]
    InvalidExitCode { at: usize, code: i64 },

    /// Value that cannot be converted (e.g. non-finite float to int).
    #[error("{opcode} can't convert {value} at instruction {at}")]
    ValueOutOfRange {
        at: usize,
        opcode: Opcode,
        value: String,
    },

    /// `INT2CHAR` of a number that is not a Unicode scalar value.
    #[error("{code} is not a valid code point at instruction {at}")]
    InvalidCodePoint { at: usize, code: i64 },

    /// String index outside [0, length).
    #[error("{opcode} index {index} out of range for length {length} at instruction {at}")]
    StringIndexOutOfRange {
        at: usize,
        opcode: Opcode,
        index: i64,
        length: usize,
    },

    /// `SETCHAR` with an empty replacement string.
    #[error("SETCHAR with empty replacement string at instruction {at}")]
    EmptyReplacement { at: usize },

    /// Reading input or writing output failed.
    #[error("I/O error at instruction {at}: {message}")]
    Io { at: usize, message: String },
}

impl RuntimeError {
    /// Exit code for a run that failed with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RuntimeError::InvalidLiteral { .. } | RuntimeError::MalformedInstruction { .. } => {
                ExitCode::MalformedProgram
            }
            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::VariableRedefined { .. } => ExitCode::Semantic,
            RuntimeError::BadOperandType { .. } | RuntimeError::KindMismatch { .. } => {
                ExitCode::OperandType
            }
            RuntimeError::UndefinedVariable { .. } => ExitCode::UndefinedVariable,
            RuntimeError::UndefinedFrame { .. } => ExitCode::UndefinedFrame,
            RuntimeError::UninitializedVariable { .. }
            | RuntimeError::EmptyCallStack { .. }
            | RuntimeError::StackUnderflow { .. } => ExitCode::MissingValue,
            RuntimeError::DivisionByZero { .. }
            | RuntimeError::InvalidExitCode { .. }
            | RuntimeError::ValueOutOfRange { .. } => ExitCode::OperandValue,
            RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::StringIndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement { .. } => ExitCode::StringOperation,
            RuntimeError::Io { .. } => ExitCode::Internal,
        }
    }

    /// Position of the failing instruction (1-based).
    pub fn at(&self) -> usize {
        match self {
            RuntimeError::InvalidLiteral { at, .. }
            | RuntimeError::MalformedInstruction { at, .. }
            | RuntimeError::DuplicateLabel { at, .. }
            | RuntimeError::UndefinedLabel { at, .. }
            | RuntimeError::VariableRedefined { at, .. }
            | RuntimeError::BadOperandType { at, .. }
            | RuntimeError::KindMismatch { at, .. }
            | RuntimeError::UndefinedVariable { at, .. }
            | RuntimeError::UndefinedFrame { at, .. }
            | RuntimeError::UninitializedVariable { at, .. }
            | RuntimeError::EmptyCallStack { at }
            | RuntimeError::StackUnderflow { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::InvalidExitCode { at, .. }
            | RuntimeError::ValueOutOfRange { at, .. }
            | RuntimeError::InvalidCodePoint { at, .. }
            | RuntimeError::StringIndexOutOfRange { at, .. }
            | RuntimeError::EmptyReplacement { at }
            | RuntimeError::Io { at, .. } => *at,
        }
    }

    /// Attach a position to a frame storage error.
    pub(crate) fn from_frame(at: usize, err: FrameError) -> Self {
        match err {
            FrameError::MissingFrame(frame) => RuntimeError::UndefinedFrame { at, frame },
            FrameError::Undefined(var) => RuntimeError::UndefinedVariable {
                at,
                var: var.to_string(),
            },
            FrameError::Redefined(var) => RuntimeError::VariableRedefined {
                at,
                var: var.to_string(),
            },
            FrameError::Uninitialized(var) => RuntimeError::UninitializedVariable {
                at,
                var: var.to_string(),
            },
        }
    }

    /// Attach a position and operator to an evaluator error.
    pub(crate) fn from_op(at: usize, opcode: Opcode, err: OpError) -> Self {
        match err {
            OpError::DivisionByZero => RuntimeError::DivisionByZero { at },
            OpError::KindMismatch { left, right } => RuntimeError::KindMismatch {
                at,
                opcode,
                left,
                right,
            },
            OpError::InvalidCodePoint(code) => RuntimeError::InvalidCodePoint { at, code },
            OpError::IndexOutOfRange { index, length } => RuntimeError::StringIndexOutOfRange {
                at,
                opcode,
                index,
                length,
            },
            OpError::EmptyReplacement => RuntimeError::EmptyReplacement { at },
            OpError::NotRepresentable(value) => RuntimeError::ValueOutOfRange {
                at,
                opcode,
                value,
            },
        }
    }
}
