//! IPPcode22 common types.
//!
//! This crate provides the data structures shared by the loader, verifier,
//! VM and CLI:
//!
//! - [`Opcode`]: the 56 opcodes, with argument signatures
//! - [`TypeTag`]: the five value kinds
//! - [`Value`]: runtime values with canonical and debug rendering
//! - [`Instruction`], [`Arg`], [`VarRef`], [`Literal`]: the instruction model
//! - [`Program`], [`LabelTable`]: an order-sorted instruction sequence
//! - [`ExitCode`]: the process exit-code taxonomy
//! - [`DecodeError`], [`LiteralError`]: textual decoding failures

pub mod error;
pub mod exit_code;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{DecodeError, LiteralError};
pub use exit_code::ExitCode;
pub use instruction::{Arg, FrameKind, Instruction, Literal, VarRef};
pub use opcode::{ArgKind, Opcode};
pub use program::{LabelTable, Program};
pub use type_tag::TypeTag;
pub use value::Value;
