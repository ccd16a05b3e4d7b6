//! Literal convertibility pass.
//!
//! Every literal argument must convert to its declared type: integers in
//! decimal, floats in decimal or hex-float form, `true`/`false`, `nil`, and
//! strings whose backslashes introduce exactly three decimal digits.

use crate::error::VerifyError;
use ippvm_common::{Arg, Instruction};

/// Run the literal pass.
pub fn check_literals(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    for (i, instr) in instrs.iter().enumerate() {
        for arg in &instr.args {
            if let Arg::Literal(literal) = arg {
                if let Err(err) = literal.to_value() {
                    errors.push(VerifyError::InvalidLiteral {
                        at: i + 1,
                        tag: err.tag,
                        text: err.text,
                    });
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippvm_common::{Literal, Opcode, TypeTag};

    fn write(tag: TypeTag, text: &str) -> Instruction {
        Instruction::new(Opcode::Write, 1, vec![Arg::Literal(Literal::new(tag, text))])
    }

    #[test]
    fn valid_literals() {
        let instrs = vec![
            write(TypeTag::Int, "-17"),
            write(TypeTag::Float, "0x1.8p+1"),
            write(TypeTag::Float, "2.5"),
            write(TypeTag::Bool, "false"),
            write(TypeTag::Nil, "nil"),
            write(TypeTag::String, "a\\032b"),
            write(TypeTag::String, ""),
        ];
        assert!(check_literals(&instrs).is_empty());
    }

    #[test]
    fn invalid_literals() {
        let instrs = vec![
            write(TypeTag::Int, "1.5"),
            write(TypeTag::Bool, "True"),
            write(TypeTag::String, "bad\\12"),
            write(TypeTag::Float, "one"),
        ];
        let errors = check_literals(&instrs);
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors[0],
            VerifyError::InvalidLiteral {
                at: 1,
                tag: TypeTag::Int,
                text: "1.5".to_string()
            }
        );
    }
}
