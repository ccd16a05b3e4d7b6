//! Label pass: every label is declared once, and every jump or call names a
//! declared label.

use crate::error::VerifyError;
use ippvm_common::{Arg, Instruction, Opcode};
use std::collections::HashSet;

/// Opcodes whose first argument is a jump or call target.
fn is_branch(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::Call
            | Opcode::Jump
            | Opcode::JumpIfEq
            | Opcode::JumpIfNeq
            | Opcode::JumpIfEqS
            | Opcode::JumpIfNeqS
    )
}

/// Run the label pass.
pub fn check_labels(instrs: &[Instruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut declared = HashSet::new();

    for (i, instr) in instrs.iter().enumerate() {
        if let Some(label) = instr.declared_label() {
            if !declared.insert(label) {
                errors.push(VerifyError::DuplicateLabel {
                    at: i + 1,
                    label: label.to_string(),
                });
            }
        }
    }

    for (i, instr) in instrs.iter().enumerate() {
        if !is_branch(instr.opcode) {
            continue;
        }
        if let Some(Arg::Label(target)) = instr.args.first() {
            if !declared.contains(target.as_str()) {
                errors.push(VerifyError::UndefinedLabel {
                    at: i + 1,
                    label: target.clone(),
                });
            }
        }
    }

    errors
}
