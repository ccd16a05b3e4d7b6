//! Operand checks applied before an operator consumes a value.
//!
//! Two phases: a literal must convert to its declared kind (malformed
//! program otherwise), then the value's kind must belong to the operator's
//! accepted set (operand type error otherwise).

use crate::error::RuntimeError;
use ippvm_common::{Literal, Opcode, TypeTag, Value};

pub const INT: &[TypeTag] = &[TypeTag::Int];
pub const FLOAT: &[TypeTag] = &[TypeTag::Float];
pub const BOOL: &[TypeTag] = &[TypeTag::Bool];
pub const STRING: &[TypeTag] = &[TypeTag::String];
pub const ANY: &[TypeTag] = &ippvm_common::type_tag::ALL_TYPE_TAGS;
pub use ippvm_common::type_tag::{NUMERIC, ORDERED};

/// Convert a literal argument into a value.
pub fn convert(at: usize, literal: &Literal) -> Result<Value, RuntimeError> {
    literal.to_value().map_err(|err| RuntimeError::InvalidLiteral {
        at,
        tag: err.tag,
        text: err.text,
    })
}

fn rejected(at: usize, opcode: Opcode, value: &Value, accepted: &[TypeTag]) -> RuntimeError {
    RuntimeError::BadOperandType {
        at,
        opcode,
        value: value.typed(),
        kind: value.type_tag(),
        accepted: accepted
            .iter()
            .map(TypeTag::name)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Require `value`'s kind to be one of `accepted`.
pub fn expect(
    at: usize,
    opcode: Opcode,
    value: &Value,
    accepted: &[TypeTag],
) -> Result<(), RuntimeError> {
    if accepted.contains(&value.type_tag()) {
        return Ok(());
    }
    Err(rejected(at, opcode, value, accepted))
}

/// Unwrap an Int operand.
pub fn int(at: usize, opcode: Opcode, value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(rejected(at, opcode, &other, INT)),
    }
}

/// Unwrap a Float operand.
pub fn float(at: usize, opcode: Opcode, value: Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Float(x) => Ok(x),
        other => Err(rejected(at, opcode, &other, FLOAT)),
    }
}

/// Unwrap a String operand.
pub fn string(at: usize, opcode: Opcode, value: Value) -> Result<String, RuntimeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(rejected(at, opcode, &other, STRING)),
    }
}
