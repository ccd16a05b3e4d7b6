//! Arithmetic, relational, boolean and string evaluators.
//!
//! These are pure functions over operands that already passed the kind
//! membership check; they only reject what depends on the operand pair or
//! on the operand values.

use ippvm_common::{TypeTag, Value};
use thiserror::Error;

/// Evaluation failures, positioned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// Zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// Operand kinds that cannot be combined.
    #[error("can't combine {left} with {right}")]
    KindMismatch { left: TypeTag, right: TypeTag },

    /// Not a Unicode scalar value.
    #[error("{0} is not a valid code point")]
    InvalidCodePoint(i64),

    /// String index outside [0, length).
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    /// Empty replacement string for `SETCHAR`.
    #[error("empty replacement string")]
    EmptyReplacement,

    /// Float with no integer counterpart.
    #[error("{0} has no integer value")]
    NotRepresentable(String),
}

/// The five arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    IDiv,
    Div,
}

/// Relational and equality operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
}

/// Binary boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

fn mismatch(a: &Value, b: &Value) -> OpError {
    OpError::KindMismatch {
        left: a.type_tag(),
        right: b.type_tag(),
    }
}

/// Integer division rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

/// Apply an arithmetic operator.
///
/// Int⊕Int stays Int (wrapping on overflow); a Float on either side promotes
/// both to Float. `DIV` always produces Float.
pub fn arithmetic(op: ArithOp, a: &Value, b: &Value) -> Result<Value, OpError> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        let (x, y) = (*x, *y);
        return match op {
            ArithOp::Add => Ok(Value::Int(x.wrapping_add(y))),
            ArithOp::Sub => Ok(Value::Int(x.wrapping_sub(y))),
            ArithOp::Mul => Ok(Value::Int(x.wrapping_mul(y))),
            ArithOp::IDiv if y == 0 => Err(OpError::DivisionByZero),
            ArithOp::IDiv => Ok(Value::Int(floor_div(x, y))),
            ArithOp::Div if y == 0 => Err(OpError::DivisionByZero),
            ArithOp::Div => Ok(Value::Float(x as f64 / y as f64)),
        };
    }

    let (x, y) = match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(mismatch(a, b)),
    };
    let result = match op {
        ArithOp::Add => x + y,
        ArithOp::Sub => x - y,
        ArithOp::Mul => x * y,
        ArithOp::IDiv | ArithOp::Div if y == 0.0 => return Err(OpError::DivisionByZero),
        ArithOp::IDiv => (x / y).floor(),
        ArithOp::Div => x / y,
    };
    Ok(Value::Float(result))
}

/// Apply a relational or equality operator.
///
/// `EQ` treats nil as equal only to nil, whatever the other operand's kind.
/// Everything else requires both operands to share a kind.
pub fn compare(op: CmpOp, a: &Value, b: &Value) -> Result<bool, OpError> {
    if op == CmpOp::Eq {
        match (a, b) {
            (Value::Nil, Value::Nil) => return Ok(true),
            (Value::Nil, _) | (_, Value::Nil) => return Ok(false),
            _ => {}
        }
    }

    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => x.partial_cmp(y),
        _ => return Err(mismatch(a, b)),
    };

    Ok(match (op, ordering) {
        (_, None) => false,
        (CmpOp::Lt, Some(o)) => o.is_lt(),
        (CmpOp::Gt, Some(o)) => o.is_gt(),
        (CmpOp::Eq, Some(o)) => o.is_eq(),
    })
}

/// Apply `AND` or `OR` to two Bool operands.
pub fn logic(op: LogicOp, a: &Value, b: &Value) -> Result<bool, OpError> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(match op {
            LogicOp::And => *x && *y,
            LogicOp::Or => *x || *y,
        }),
        _ => Err(mismatch(a, b)),
    }
}

/// `INT2CHAR`: code point to a one-character string.
pub fn int_to_char(code: i64) -> Result<String, OpError> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .ok_or(OpError::InvalidCodePoint(code))
}

fn char_index(s: &str, index: i64) -> Result<usize, OpError> {
    let length = s.chars().count();
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(OpError::IndexOutOfRange { index, length })
}

/// `STRI2INT`: code point of the character at `index`.
pub fn stri_to_int(s: &str, index: i64) -> Result<i64, OpError> {
    let i = char_index(s, index)?;
    Ok(s.chars().nth(i).map_or(0, |c| c as i64))
}

/// `GETCHAR`: the character at `index` as a string.
pub fn get_char(s: &str, index: i64) -> Result<String, OpError> {
    let i = char_index(s, index)?;
    Ok(s.chars().nth(i).map(String::from).unwrap_or_default())
}

/// `SETCHAR`: replace the character at `index` with the first character of
/// `replacement`.
pub fn set_char(s: &str, index: i64, replacement: &str) -> Result<String, OpError> {
    let i = char_index(s, index)?;
    let c = replacement.chars().next().ok_or(OpError::EmptyReplacement)?;
    Ok(s.chars()
        .enumerate()
        .map(|(pos, orig)| if pos == i { c } else { orig })
        .collect())
}

/// `FLOAT2INT`: truncate toward zero.
pub fn float_to_int(x: f64) -> Result<i64, OpError> {
    let t = x.trunc();
    if !t.is_finite() || t < i64::MIN as f64 || t >= i64::MAX as f64 {
        return Err(OpError::NotRepresentable(Value::Float(x).to_string()));
    }
    Ok(t as i64)
}
