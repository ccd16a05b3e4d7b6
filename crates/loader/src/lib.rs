//! IPPcode22 loader: source text → order-sorted [`Program`].
//!
//! The loader checks the header and the shape of every argument. Literal
//! convertibility and label resolution are left to the verifier and the VM.
//!
//! # Usage
//!
//! ```
//! use ippvm_loader::{load, render};
//!
//! let text = ".IPPcode22\nDEFVAR GF@x\nMOVE GF@x int@42\nWRITE GF@x\n";
//! let program = load(text).unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(render(&program), text);
//! ```

pub mod error;

mod lexer;
mod parser;

pub use error::LoadError;

use ippvm_common::Program;
use lexer::tokenize_line;
use parser::parse_line;

/// Header every source file starts with, matched case-insensitively.
pub const HEADER: &str = ".IPPcode22";

/// Load source text into a program. Declared orders are 1, 2, 3, … in line
/// order.
///
/// Returns the first error encountered.
pub fn load(text: &str) -> Result<Program, LoadError> {
    let mut instructions = Vec::new();
    let mut header_seen = false;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line);
        if tokens.is_empty() {
            continue;
        }
        if !header_seen {
            match tokens.as_slice() {
                [header] if header.eq_ignore_ascii_case(HEADER) => {
                    header_seen = true;
                    continue;
                }
                _ => return Err(LoadError::MissingHeader { line: line_num }),
            }
        }
        let order = instructions.len() as u32 + 1;
        if let Some(instr) = parse_line(&tokens, line_num, order)? {
            instructions.push(instr);
        }
    }

    if !header_seen {
        return Err(LoadError::MissingHeader {
            line: text.lines().count(),
        });
    }
    Ok(Program::new(instructions))
}

/// Render a program as canonical source text: the header, then one
/// instruction per line. Declared orders are not written.
pub fn render(program: &Program) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for instr in &program.instructions {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}
