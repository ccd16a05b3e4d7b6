//! IPPcode22 virtual machine: executes order-sorted instruction sequences.
//!
//! The VM is a frame/stack hybrid with:
//! - A global frame, a stack of local frames and an optional temporary frame
//! - An operand stack for the `S` instruction variants
//! - A call stack of return positions
//!
//! # Usage
//!
//! ```
//! use ippvm_common::{Arg, Instruction, Literal, Opcode, Program, TypeTag};
//! use ippvm_vm::{Halt, VM};
//!
//! let program = Program::new(vec![
//!     Instruction::new(
//!         Opcode::Write,
//!         1,
//!         vec![Arg::Literal(Literal::new(TypeTag::String, "hi\\010"))],
//!     ),
//!     Instruction::new(Opcode::Exit, 2, vec![Arg::Literal(Literal::new(TypeTag::Int, "3"))]),
//! ]);
//!
//! let mut out = Vec::new();
//! let halt = VM::new(&program).with_output(&mut out).execute().unwrap();
//! assert_eq!(halt, Halt::Exit(3));
//! assert_eq!(out, b"hi\n");
//! ```

pub mod error;
pub mod execute;
pub mod frames;
pub mod machine;
pub mod ops;
pub mod stats;
pub mod type_check;

pub use error::RuntimeError;
pub use frames::{Frame, FrameError, Frames};
pub use machine::{Halt, VM};
pub use stats::{StatKind, Stats};

use ippvm_common::Program;
use std::io::{BufRead, Write};

/// Execute a program with explicit input and output.
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first fatal condition.
pub fn run_with_io<R: BufRead, W: Write>(
    program: &Program,
    input: R,
    output: W,
) -> Result<Halt, RuntimeError> {
    VM::new(program)
        .with_input(input)
        .with_output(output)
        .execute()
}
