//! Instructions and their typed arguments.
//!
//! An instruction carries its opcode, the order it was declared with, and up
//! to three arguments. Literals keep their source text; conversion to a
//! [`Value`] happens when the instruction is checked or executed.

use crate::error::{DecodeError, LiteralError};
use crate::opcode::Opcode;
use crate::type_tag::TypeTag;
use crate::value::{encode_escapes, Value};
use std::fmt;
use std::str::FromStr;

/// Which frame a variable reference targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`: the global frame.
    Global,
    /// `LF`: the innermost local frame.
    Local,
    /// `TF`: the temporary frame.
    Temporary,
}

impl FrameKind {
    /// Two-letter prefix used in source text.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Returns true if `name` is a valid variable or label identifier.
///
/// Identifiers start with a letter or one of `_-$&%*!?` and continue with
/// those characters or digits.
pub fn is_identifier(name: &str) -> bool {
    let special = |c: char| "_-$&%*!?".contains(c);
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || special(c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || special(c))
}

/// A reference to a variable: frame plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    /// Target frame.
    pub frame: FrameKind,
    /// Variable name.
    pub name: String,
}

impl VarRef {
    /// Create a new variable reference.
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl FromStr for VarRef {
    type Err = DecodeError;

    /// Parse `GF@name`, `LF@name` or `TF@name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::InvalidVariable(s.to_string());
        let (prefix, name) = s.split_once('@').ok_or_else(invalid)?;
        let frame = match prefix {
            "GF" => FrameKind::Global,
            "LF" => FrameKind::Local,
            "TF" => FrameKind::Temporary,
            _ => return Err(invalid()),
        };
        if !is_identifier(name) {
            return Err(invalid());
        }
        Ok(VarRef::new(frame, name))
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A literal argument: declared type plus the text that follows `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// Declared type.
    pub tag: TypeTag,
    /// Raw source text.
    pub text: String,
}

impl Literal {
    /// Create a new literal.
    pub fn new(tag: TypeTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    /// Literal holding an already-converted value.
    pub fn from_value(value: &Value) -> Self {
        let text = match value {
            Value::String(s) => encode_escapes(s),
            Value::Nil => "nil".to_string(),
            other => other.to_string(),
        };
        Self::new(value.type_tag(), text)
    }

    /// Convert the text to a value of the declared type.
    pub fn to_value(&self) -> Result<Value, LiteralError> {
        Value::parse_literal(self.tag, &self.text)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.tag, self.text)
    }
}

/// One instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A variable reference.
    Var(VarRef),
    /// A typed literal.
    Literal(Literal),
    /// A label name.
    Label(String),
    /// A type name.
    Type(TypeTag),
}

impl Arg {
    /// Short name of the argument's shape for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Arg::Var(_) => "var",
            Arg::Literal(_) => "literal",
            Arg::Label(_) => "label",
            Arg::Type(_) => "type",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Var(var) => write!(f, "{var}"),
            Arg::Literal(lit) => write!(f, "{lit}"),
            Arg::Label(label) => f.write_str(label),
            Arg::Type(tag) => write!(f, "{tag}"),
        }
    }
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Declared order. Strictly increasing across a program.
    pub order: u32,
    /// Arguments in position order.
    pub args: Vec<Arg>,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, order: u32, args: Vec<Arg>) -> Self {
        Self {
            opcode,
            order,
            args,
        }
    }

    /// The label named by this instruction if it is a `LABEL`.
    pub fn declared_label(&self) -> Option<&str> {
        match (self.opcode, self.args.first()) {
            (Opcode::Label, Some(Arg::Label(name))) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_refs() {
        assert_eq!(
            "GF@x".parse::<VarRef>(),
            Ok(VarRef::new(FrameKind::Global, "x"))
        );
        assert_eq!(
            "LF@_tmp-1".parse::<VarRef>(),
            Ok(VarRef::new(FrameKind::Local, "_tmp-1"))
        );
        assert_eq!(
            "TF@?ok!".parse::<VarRef>(),
            Ok(VarRef::new(FrameKind::Temporary, "?ok!"))
        );
    }

    #[test]
    fn reject_bad_var_refs() {
        for bad in ["gf@x", "XF@x", "GF@", "GF@1abc", "GFx", "GF@a b"] {
            assert_eq!(
                bad.parse::<VarRef>(),
                Err(DecodeError::InvalidVariable(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("loop"));
        assert!(is_identifier("$main%1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("a@b"));
    }

    #[test]
    fn literal_to_value() {
        let lit = Literal::new(TypeTag::Int, "42");
        assert_eq!(lit.to_value(), Ok(Value::Int(42)));
        let bad = Literal::new(TypeTag::Float, "4x2");
        assert!(bad.to_value().is_err());
    }

    #[test]
    fn literal_from_value_roundtrips() {
        for value in [
            Value::Int(-3),
            Value::Float(0.75),
            Value::Bool(false),
            Value::String("a b\\".into()),
            Value::Nil,
        ] {
            assert_eq!(Literal::from_value(&value).to_value(), Ok(value));
        }
    }

    #[test]
    fn display_instruction() {
        let instr = Instruction::new(
            Opcode::Add,
            3,
            vec![
                Arg::Var(VarRef::new(FrameKind::Global, "x")),
                Arg::Literal(Literal::new(TypeTag::Int, "1")),
                Arg::Var(VarRef::new(FrameKind::Local, "y")),
            ],
        );
        assert_eq!(instr.to_string(), "ADD GF@x int@1 LF@y");
    }

    #[test]
    fn declared_label() {
        let label = Instruction::new(Opcode::Label, 1, vec![Arg::Label("end".into())]);
        assert_eq!(label.declared_label(), Some("end"));
        let jump = Instruction::new(Opcode::Jump, 2, vec![Arg::Label("end".into())]);
        assert_eq!(jump.declared_label(), None);
    }
}
