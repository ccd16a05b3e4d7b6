//! Runtime value representation for the IPPcode22 VM.
//!
//! Values live in frame slots and on the operand stack. `Display` gives the
//! canonical output form used by `WRITE`; [`Value::typed`] gives the
//! `type@value` form used by debug dumps.

use crate::error::LiteralError;
use crate::type_tag::TypeTag;
use std::fmt;

/// Runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Unicode string with escapes already decoded.
    String(String),
    /// The nil value.
    Nil,
}

// Floats compare bitwise so Value stays Eq. The VM never compares floats
// through this impl; EQ/LT/GT go through the evaluators.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Bool,
            Value::String(_) => TypeTag::String,
            Value::Nil => TypeTag::Nil,
        }
    }

    /// Numeric coercion used by mixed arithmetic. `None` for non-numeric kinds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert the text of a literal argument into a value of kind `tag`.
    ///
    /// String escapes (`\ddd`, a backslash followed by exactly three decimal
    /// digits) are decoded here, so the stored string holds the real
    /// characters.
    pub fn parse_literal(tag: TypeTag, text: &str) -> Result<Value, LiteralError> {
        let invalid = || LiteralError {
            tag,
            text: text.to_string(),
        };
        match tag {
            TypeTag::Int => text.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            TypeTag::Float => parse_float(text).map(Value::Float).ok_or_else(invalid),
            TypeTag::Bool => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            TypeTag::String => decode_escapes(text).map(Value::String).ok_or_else(invalid),
            TypeTag::Nil => match text {
                "nil" => Ok(Value::Nil),
                _ => Err(invalid()),
            },
        }
    }

    /// Convert one line of runtime input for `READ`.
    ///
    /// `None` (end of input) and unparsable text produce `Nil`. Bools are
    /// `true` for any casing of "true" and `false` for everything else.
    pub fn parse_input(tag: TypeTag, line: Option<&str>) -> Value {
        let Some(line) = line else {
            return Value::Nil;
        };
        match tag {
            TypeTag::Int => line.trim().parse().map(Value::Int).unwrap_or(Value::Nil),
            TypeTag::Float => parse_float(line).map(Value::Float).unwrap_or(Value::Nil),
            TypeTag::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
            TypeTag::String => Value::String(line.to_string()),
            TypeTag::Nil => Value::Nil,
        }
    }

    /// `type@value` rendering with non-printable string characters escaped.
    pub fn typed(&self) -> String {
        match self {
            Value::String(s) => format!("string@{}", encode_escapes(s)),
            Value::Nil => "nil@nil".to_string(),
            other => format!("{}@{}", other.type_tag(), other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_hex_float(*x)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Nil => Ok(()),
        }
    }
}

/// Parse a float from decimal or hexadecimal floating-point text.
///
/// Accepts everything `f64::from_str` does plus hex floats such as
/// `0x1.8p+1`, `-0x1p-2` or `1.8p1`. Hex text needs the `0x` prefix, the
/// `p` exponent, or both.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(x) = text.parse::<f64>() {
        return Some(x);
    }
    parse_hex_float(text)
}

fn parse_hex_float(text: &str) -> Option<f64> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let prefixed = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"));
    let rest = prefixed.unwrap_or(rest);

    let (mantissa, exponent) = match rest.find(['p', 'P']) {
        Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i32>().ok()?),
        None if prefixed.is_some() => (rest, 0),
        None => return None,
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value = 0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }

    let value = scale_by_pow2(value, exponent);
    Some(if negative { -value } else { value })
}

/// `value * 2^exponent` without overflowing or flushing the intermediate
/// power of two when the result itself is representable.
fn scale_by_pow2(mut value: f64, mut exponent: i32) -> f64 {
    let biased = ((value.to_bits() >> 52) & 0x7ff) as i32;
    if biased != 0 && biased != 0x7ff {
        // bring the mantissa into [1, 2)
        let shift = biased - 1023;
        value *= 2f64.powi(-shift);
        exponent = exponent.saturating_add(shift);
    }
    while exponent > 1023 && value.is_finite() {
        value *= 2f64.powi(1023);
        exponent -= 1023;
    }
    while exponent < -1022 && value != 0.0 {
        value *= 2f64.powi(-1022);
        exponent += 1022;
    }
    value * 2f64.powi(exponent)
}

/// Render a float in hexadecimal floating-point form, e.g. `0x1.c000000000000p+2`.
pub fn format_hex_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let bits = x.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & 0x000f_ffff_ffff_ffff;

    if biased == 0 && fraction == 0 {
        return format!("{sign}0x0.0p+0");
    }
    let (lead, exponent) = if biased == 0 {
        (0, -1022)
    } else {
        (1, biased - 1023)
    };
    format!("{sign}0x{lead}.{fraction:013x}p{exponent:+}")
}

/// Decode `\ddd` escapes. `None` if a backslash is not followed by three digits.
pub fn decode_escapes(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut code = 0u32;
        for _ in 0..3 {
            code = code * 10 + chars.next()?.to_digit(10)?;
        }
        out.push(char::from_u32(code)?);
    }
    Some(out)
}

/// Escape whitespace, control characters, `#` and `\` as `\ddd`.
pub fn encode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) <= 32 || c == '#' || c == '\\' {
            out.push_str(&format!("\\{:03}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
