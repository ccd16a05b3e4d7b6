//! Process exit codes shared by every stage of a run.
//!
//! Loader, verifier and VM errors all map onto this single taxonomy so the
//! CLI can terminate with the right status no matter where a run failed.

use std::fmt;

/// Exit status of the `ippvm` process.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    /// Program finished normally.
    Ok = 0,
    /// Missing or contradictory command-line argument.
    MissingArgument = 10,
    /// A source or input file could not be opened.
    InputFile = 11,
    /// The stats file could not be written.
    OutputFile = 12,
    /// Malformed program structure or a literal that does not convert.
    MalformedProgram = 32,
    /// Duplicate or undefined label, variable redefinition.
    Semantic = 52,
    /// Operand of the wrong type.
    OperandType = 53,
    /// Access to a variable that does not exist.
    UndefinedVariable = 54,
    /// Access to a frame that does not exist.
    UndefinedFrame = 55,
    /// Missing value: uninitialized variable, empty call or operand stack.
    MissingValue = 56,
    /// Operand with a wrong value (division by zero, bad exit code).
    OperandValue = 57,
    /// Invalid string operation.
    StringOperation = 58,
    /// Anything unanticipated.
    Internal = 99,
}

impl ExitCode {
    /// Numeric process status.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
