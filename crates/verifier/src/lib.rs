//! IPPcode22 verifier: static checks for instruction streams.
//!
//! The verifier checks a `Program` for correctness BEFORE execution.
//! It collects ALL errors (not just the first) and returns them.
//!
//! # Usage
//!
//! ```
//! use ippvm_common::{Arg, Instruction, Literal, Opcode, Program, TypeTag};
//! use ippvm_verifier::verify;
//!
//! let program = Program::new(vec![Instruction::new(
//!     Opcode::Write,
//!     1,
//!     vec![Arg::Literal(Literal::new(TypeTag::Int, "42"))],
//! )]);
//!
//! assert!(verify(&program).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Structural**: strictly increasing orders, argument count and shape
//! 2. **Literals**: every literal converts to its declared type
//! 3. **Labels**: no duplicate declarations, no undefined targets

pub mod error;
pub mod labels;
pub mod literals;
pub mod structural;

pub use error::VerifyError;

use ippvm_common::Program;

/// Verify a program for correctness.
///
/// Returns `Ok(())` if the program passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found, pass by pass.
pub fn verify(program: &Program) -> Result<(), Vec<VerifyError>> {
    let instrs = &program.instructions;
    let mut all_errors = Vec::new();

    // Pass 1: Structural
    all_errors.extend(structural::check_structural(instrs));

    // Pass 2: Literals
    all_errors.extend(literals::check_literals(instrs));

    // Pass 3: Labels
    all_errors.extend(labels::check_labels(instrs));

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippvm_common::{Arg, ExitCode, Instruction, Literal, Opcode, TypeTag};

    fn write_int(order: u32, text: &str) -> Instruction {
        Instruction::new(
            Opcode::Write,
            order,
            vec![Arg::Literal(Literal::new(TypeTag::Int, text))],
        )
    }

    #[test]
    fn empty_program() {
        assert!(verify(&Program::new(vec![])).is_ok());
    }

    #[test]
    fn multiple_errors_collected() {
        let program = Program::new(vec![
            write_int(2, "x"),
            write_int(1, "1"),
            Instruction::new(Opcode::Jump, 3, vec![Arg::Label("gone".into())]),
        ]);
        let errors = verify(&program).unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
        assert!(matches!(errors[0], VerifyError::UnorderedInstruction { at: 2, .. }));
        assert!(matches!(errors[1], VerifyError::InvalidLiteral { at: 1, .. }));
        assert!(matches!(errors[2], VerifyError::UndefinedLabel { at: 3, .. }));
    }

    #[test]
    fn first_error_decides_exit_code() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Jump, 1, vec![Arg::Label("gone".into())]),
            write_int(2, "1"),
        ]);
        let errors = verify(&program).unwrap_err();
        assert_eq!(errors[0].exit_code(), ExitCode::Semantic);
    }
}
