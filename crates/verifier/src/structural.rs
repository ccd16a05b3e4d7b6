//! Structural validation pass for IPPcode22 programs.
//!
//! Checks that declared orders are positive and strictly increasing, and
//! that every instruction carries exactly the argument shapes its opcode
//! requires.

use crate::error::{shape_name, VerifyError};
use ippvm_common::{Arg, ArgKind, Instruction};

/// Run the structural validation pass.
pub fn check_structural(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut previous: Option<u32> = None;

    for (i, instr) in instrs.iter().enumerate() {
        let at = i + 1;

        if instr.order == 0 {
            errors.push(VerifyError::ZeroOrder { at });
        }
        if let Some(prev) = previous {
            if instr.order <= prev {
                errors.push(VerifyError::UnorderedInstruction {
                    at,
                    order: instr.order,
                    previous: prev,
                });
            }
        }
        previous = Some(instr.order);

        let signature = instr.opcode.signature();
        if instr.args.len() != signature.len() {
            errors.push(VerifyError::ArgumentCount {
                at,
                opcode: instr.opcode,
                expected: signature.len(),
                found: instr.args.len(),
            });
            continue;
        }

        for (position, (kind, arg)) in signature.iter().zip(&instr.args).enumerate() {
            if !fits(*kind, arg) {
                errors.push(VerifyError::ArgumentShape {
                    at,
                    opcode: instr.opcode,
                    position: position + 1,
                    expected: shape_name(*kind),
                    found: arg.kind_name(),
                });
            }
        }
    }

    errors
}

fn fits(kind: ArgKind, arg: &Arg) -> bool {
    matches!(
        (kind, arg),
        (ArgKind::Var, Arg::Var(_))
            | (ArgKind::Symb, Arg::Var(_) | Arg::Literal(_))
            | (ArgKind::Label, Arg::Label(_))
            | (ArgKind::Type, Arg::Type(_))
    )
}
