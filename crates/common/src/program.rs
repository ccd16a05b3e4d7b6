//! Program representation: an order-sorted instruction sequence and its
//! label table.

use crate::error::DecodeError;
use crate::instruction::Instruction;
use std::collections::HashMap;

/// A program: instructions sorted by strictly increasing declared order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from instructions already in execution order.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Build the label table. Fails on the second declaration of a name.
    pub fn labels(&self) -> Result<LabelTable, DecodeError> {
        LabelTable::build(&self.instructions)
    }
}

/// Label name → zero-based position of its `LABEL` instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    positions: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan the instructions for `LABEL` declarations.
    pub fn build(instructions: &[Instruction]) -> Result<Self, DecodeError> {
        let mut positions = HashMap::new();
        for (position, instr) in instructions.iter().enumerate() {
            if let Some(label) = instr.declared_label() {
                if positions.insert(label.to_string(), position).is_some() {
                    return Err(DecodeError::DuplicateLabel {
                        label: label.to_string(),
                        position: position + 1,
                    });
                }
            }
        }
        Ok(Self { positions })
    }

    /// Position of `label`, if declared.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Number of declared labels.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no labels are declared.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
