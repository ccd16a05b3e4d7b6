//! Type names of the IPPcode22 value model.
//!
//! A type tag is what `TYPE` reports, what `READ` converts input to, and the
//! prefix of every literal argument (`int@5`, `string@abc`).

use crate::error::DecodeError;
use std::fmt;
use std::str::FromStr;

/// Kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    /// Signed 64-bit integer.
    Int,
    /// IEEE 754 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Unicode string.
    String,
    /// The nil value.
    Nil,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 5] = [
    TypeTag::Int,
    TypeTag::Float,
    TypeTag::Bool,
    TypeTag::String,
    TypeTag::Nil,
];

/// Kinds accepted by the arithmetic operators.
pub const NUMERIC: &[TypeTag] = &[TypeTag::Int, TypeTag::Float];

/// Kinds accepted by `LT` and `GT`.
pub const ORDERED: &[TypeTag] = &[TypeTag::Int, TypeTag::Float, TypeTag::Bool, TypeTag::String];

impl TypeTag {
    /// Returns the source-level name (`int`, `float`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Nil => "nil",
        }
    }

}

impl FromStr for TypeTag {
    type Err = DecodeError;

    /// Type names are lowercase; `INT` is not a type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TYPE_TAGS
            .iter()
            .find(|tag| tag.name() == s)
            .copied()
            .ok_or_else(|| DecodeError::UnknownType(s.to_string()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
