//! Opcode definitions for the IPPcode22 instruction set.

use crate::error::DecodeError;
use std::fmt;
use std::str::FromStr;

/// Shape of a single instruction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// A variable reference (`GF@x`).
    Var,
    /// A variable reference or a literal.
    Symb,
    /// A label name.
    Label,
    /// A type name.
    Type,
}

impl ArgKind {
    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ArgKind::Var => "var",
            ArgKind::Symb => "symb",
            ArgKind::Label => "label",
            ArgKind::Type => "type",
        }
    }
}

use ArgKind::{Label as L, Symb as S, Type as T, Var as V};

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Frames, calls
    /// Copy a symbol into a variable.
    Move,
    /// Create (or replace) the temporary frame.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame into the temporary frame.
    PopFrame,
    /// Declare an uninitialized variable.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Resume after the most recent CALL.
    Return,

    // Operand stack
    /// Push a symbol onto the operand stack.
    PushS,
    /// Pop the operand stack into a variable.
    PopS,
    /// Empty the operand stack.
    ClearS,

    // Arithmetic, relational, boolean, conversion
    /// Sum.
    Add,
    /// Difference.
    Sub,
    /// Product.
    Mul,
    /// Floor division.
    IDiv,
    /// Float division.
    Div,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Equality.
    Eq,
    /// Boolean and.
    And,
    /// Boolean or.
    Or,
    /// Boolean not.
    Not,
    /// Code point to one-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,
    /// Int to float.
    Int2Float,
    /// Float to int (truncating).
    Float2Int,

    // Input/output
    /// Read one input line as the given type.
    Read,
    /// Write a symbol to standard output.
    Write,

    // Strings
    /// Concatenate two strings.
    Concat,
    /// Length of a string in characters.
    Strlen,
    /// Character at an index.
    GetChar,
    /// Replace the character at an index.
    SetChar,

    // Types
    /// Name of a symbol's type.
    Type,

    // Control flow
    /// Declare a jump target.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if two symbols are equal.
    JumpIfEq,
    /// Jump if two symbols are not equal.
    JumpIfNeq,
    /// Stop with an exit code in [0, 49].
    Exit,

    // Debugging
    /// Print a symbol to the diagnostic stream.
    DPrint,
    /// Dump VM state to the diagnostic stream.
    Break,

    // Stack variants
    /// Stack ADD.
    AddS,
    /// Stack SUB.
    SubS,
    /// Stack MUL.
    MulS,
    /// Stack IDIV.
    IDivS,
    /// Stack DIV.
    DivS,
    /// Stack LT.
    LtS,
    /// Stack GT.
    GtS,
    /// Stack EQ.
    EqS,
    /// Stack AND.
    AndS,
    /// Stack OR.
    OrS,
    /// Stack NOT.
    NotS,
    /// Stack INT2CHAR.
    Int2CharS,
    /// Stack STRI2INT.
    Stri2IntS,
    /// Stack INT2FLOAT.
    Int2FloatS,
    /// Stack FLOAT2INT.
    Float2IntS,
    /// Pop two, jump if equal.
    JumpIfEqS,
    /// Pop two, jump if not equal.
    JumpIfNeqS,
}

/// All opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 56] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::ClearS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Div,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Int2Float,
    Opcode::Float2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
    Opcode::AddS,
    Opcode::SubS,
    Opcode::MulS,
    Opcode::IDivS,
    Opcode::DivS,
    Opcode::LtS,
    Opcode::GtS,
    Opcode::EqS,
    Opcode::AndS,
    Opcode::OrS,
    Opcode::NotS,
    Opcode::Int2CharS,
    Opcode::Stri2IntS,
    Opcode::Int2FloatS,
    Opcode::Float2IntS,
    Opcode::JumpIfEqS,
    Opcode::JumpIfNeqS,
];

impl Opcode {
    /// Returns the canonical (uppercase) mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::ClearS => "CLEARS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Div => "DIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
            Opcode::AddS => "ADDS",
            Opcode::SubS => "SUBS",
            Opcode::MulS => "MULS",
            Opcode::IDivS => "IDIVS",
            Opcode::DivS => "DIVS",
            Opcode::LtS => "LTS",
            Opcode::GtS => "GTS",
            Opcode::EqS => "EQS",
            Opcode::AndS => "ANDS",
            Opcode::OrS => "ORS",
            Opcode::NotS => "NOTS",
            Opcode::Int2CharS => "INT2CHARS",
            Opcode::Stri2IntS => "STRI2INTS",
            Opcode::Int2FloatS => "INT2FLOATS",
            Opcode::Float2IntS => "FLOAT2INTS",
            Opcode::JumpIfEqS => "JUMPIFEQS",
            Opcode::JumpIfNeqS => "JUMPIFNEQS",
        }
    }

    /// The argument shapes this opcode expects, in order.
    pub fn signature(&self) -> &'static [ArgKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::ClearS
            | Opcode::Break
            | Opcode::AddS
            | Opcode::SubS
            | Opcode::MulS
            | Opcode::IDivS
            | Opcode::DivS
            | Opcode::LtS
            | Opcode::GtS
            | Opcode::EqS
            | Opcode::AndS
            | Opcode::OrS
            | Opcode::NotS
            | Opcode::Int2CharS
            | Opcode::Stri2IntS
            | Opcode::Int2FloatS
            | Opcode::Float2IntS => &[],

            Opcode::DefVar | Opcode::PopS => &[V],

            Opcode::Call
            | Opcode::Label
            | Opcode::Jump
            | Opcode::JumpIfEqS
            | Opcode::JumpIfNeqS => &[L],

            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[S],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Int2Float
            | Opcode::Float2Int
            | Opcode::Strlen
            | Opcode::Type => &[V, S],

            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Div
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }

    /// True for instructions that do not count toward execution stats.
    pub fn is_bookkeeping(&self) -> bool {
        matches!(self, Opcode::Label | Opcode::DPrint | Opcode::Break)
    }
}

impl FromStr for Opcode {
    type Err = DecodeError;

    /// Mnemonics are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DecodeError::UnknownOpcode(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_roundtrip() {
        for &op in &ALL_OPCODES {
            assert_eq!(op.mnemonic().parse::<Opcode>(), Ok(op), "roundtrip failed for {op:?}");
        }
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut names: Vec<_> = ALL_OPCODES.iter().map(|op| op.mnemonic()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_OPCODES.len());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("createFrame".parse::<Opcode>(), Ok(Opcode::CreateFrame));
        assert_eq!("jumpifeqs".parse::<Opcode>(), Ok(Opcode::JumpIfEqS));
    }

    #[test]
    fn unknown_mnemonic() {
        assert_eq!(
            "FROB".parse::<Opcode>(),
            Err(DecodeError::UnknownOpcode("FROB".to_string()))
        );
    }

    #[test]
    fn signatures() {
        assert_eq!(Opcode::Move.signature(), &[ArgKind::Var, ArgKind::Symb]);
        assert_eq!(Opcode::Read.signature(), &[ArgKind::Var, ArgKind::Type]);
        assert_eq!(
            Opcode::JumpIfEq.signature(),
            &[ArgKind::Label, ArgKind::Symb, ArgKind::Symb]
        );
        assert!(Opcode::AddS.signature().is_empty());
        assert_eq!(Opcode::JumpIfNeqS.signature(), &[ArgKind::Label]);
    }

    #[test]
    fn bookkeeping_opcodes() {
        assert!(Opcode::Label.is_bookkeeping());
        assert!(Opcode::DPrint.is_bookkeeping());
        assert!(Opcode::Break.is_bookkeeping());
        assert!(!Opcode::Write.is_bookkeeping());
    }
}
