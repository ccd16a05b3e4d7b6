//! Parser for IPPcode22 tokens → instructions.
//!
//! Dispatches on the opcode's signature to read each argument in the shape
//! its position requires.

use crate::error::LoadError;
use ippvm_common::instruction::is_identifier;
use ippvm_common::{Arg, ArgKind, Instruction, Literal, Opcode, TypeTag, VarRef};

fn is_variable(token: &str) -> bool {
    ["GF@", "LF@", "TF@"]
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Parse the tokens of a single line into an instruction with the given
/// declared order.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(
    tokens: &[&str],
    line_num: usize,
    order: u32,
) -> Result<Option<Instruction>, LoadError> {
    let Some((&mnemonic, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let opcode: Opcode = mnemonic.parse().map_err(|_| LoadError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let signature = opcode.signature();
    if args.len() < signature.len() {
        return Err(LoadError::MissingArgument {
            line: line_num,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
        });
    }
    if let Some(extra) = args.get(signature.len()) {
        return Err(LoadError::UnexpectedToken {
            line: line_num,
            token: extra.to_string(),
        });
    }

    let args = signature
        .iter()
        .zip(args)
        .map(|(&kind, token)| parse_arg(kind, token, line_num))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Instruction::new(opcode, order, args)))
}

/// Parse one argument token as `kind`.
fn parse_arg(kind: ArgKind, token: &str, line_num: usize) -> Result<Arg, LoadError> {
    let invalid = || LoadError::InvalidArgument {
        line: line_num,
        expected: kind.name(),
        token: token.to_string(),
    };

    match kind {
        ArgKind::Var => token.parse::<VarRef>().map(Arg::Var).map_err(|_| invalid()),
        ArgKind::Symb if is_variable(token) => {
            token.parse::<VarRef>().map(Arg::Var).map_err(|_| invalid())
        }
        ArgKind::Symb => {
            let (prefix, text) = token.split_once('@').ok_or_else(invalid)?;
            let tag: TypeTag = prefix.parse().map_err(|_| invalid())?;
            if tag == TypeTag::Nil && text != "nil" {
                return Err(invalid());
            }
            Ok(Arg::Literal(Literal::new(tag, text)))
        }
        ArgKind::Label if is_identifier(token) => Ok(Arg::Label(token.to_string())),
        ArgKind::Label => Err(invalid()),
        ArgKind::Type => token.parse().map(Arg::Type).map_err(|_| invalid()),
    }
}
