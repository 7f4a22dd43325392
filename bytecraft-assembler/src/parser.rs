//! Statement parsing and shape validation.
//!
//! Operand kinds are inferred per token, in order: register name,
//! `[mem]` bracket, else immediate. Shape rules run here so that both
//! passes see the same validation and pass one can size instructions.

use bytecraft_spec::{encoded_size, Opcode, OperandKind};

use crate::error::{AssemblerError, Result};
use crate::lexer;

/// An operand token with its inferred addressing kind.
#[derive(Debug, Clone)]
pub struct OperandToken {
    pub kind: OperandKind,
    pub text: String,
}

/// Classify a trimmed operand token.
pub fn classify_operand(token: &str) -> OperandToken {
    let kind = if lexer::parse_register(token).is_some() {
        OperandKind::Reg
    } else if lexer::mem_inner(token).is_some() {
        OperandKind::Mem
    } else {
        OperandKind::Imm
    };
    OperandToken {
        kind,
        text: token.to_string(),
    }
}

/// A shape-validated `_main` instruction line.
#[derive(Debug, Clone)]
pub struct ParsedInstr {
    pub op: Opcode,
    /// Absent for bare instructions and branches.
    pub dst: Option<OperandToken>,
    /// Absent for bare instructions.
    pub src: Option<OperandToken>,
}

impl ParsedInstr {
    pub fn dst_kind(&self) -> OperandKind {
        self.dst
            .as_ref()
            .map_or(OperandKind::None, |operand| operand.kind)
    }

    pub fn src_kind(&self) -> OperandKind {
        self.src
            .as_ref()
            .map_or(OperandKind::None, |operand| operand.kind)
    }

    /// Encoded size in bytes, for the sizing pass.
    pub fn encoded_len(&self) -> usize {
        encoded_size(self.op, self.dst_kind(), self.src_kind())
    }
}

/// A `_data` declaration: `DB name[size]`.
#[derive(Debug, Clone)]
pub struct DataDecl {
    pub line: usize,
    pub name: String,
    pub size: u32,
}

fn shape_error(line: usize, message: &str) -> AssemblerError {
    AssemblerError::BadOperandShape {
        line,
        message: message.to_string(),
    }
}

/// Parse and shape-validate one instruction line.
pub fn parse_instruction(text: &str, line: usize) -> Result<ParsedInstr> {
    let (mnemonic, tail) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };

    let op = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AssemblerError::UnknownOpcode {
        line,
        mnemonic: mnemonic.to_string(),
    })?;

    let operands = lexer::split_operands(tail);

    if op.is_bare() {
        if !operands.is_empty() {
            return Err(AssemblerError::BadOperandCount { line, expected: 0 });
        }
        return Ok(ParsedInstr {
            op,
            dst: None,
            src: None,
        });
    }

    if op.is_branch() {
        if operands.len() != 1 {
            return Err(AssemblerError::BadOperandCount { line, expected: 1 });
        }
        let src = classify_operand(&operands[0]);
        if src.kind == OperandKind::Mem {
            return Err(shape_error(line, "branch target cannot be [mem]"));
        }
        return Ok(ParsedInstr {
            op,
            dst: None,
            src: Some(src),
        });
    }

    if operands.len() != 2 {
        return Err(AssemblerError::BadOperandCount { line, expected: 2 });
    }

    let dst = classify_operand(&operands[0]);
    let src = classify_operand(&operands[1]);

    match op {
        Opcode::Cmp => {
            if dst.kind != OperandKind::Reg {
                return Err(shape_error(line, "cmp lhs must be register"));
            }
        }
        Opcode::Mov => {
            if dst.kind != OperandKind::Reg && dst.kind != OperandKind::Mem {
                return Err(shape_error(line, "mov dst must be reg or [mem]"));
            }
            if dst.kind == OperandKind::Mem && src.kind == OperandKind::Mem {
                return Err(shape_error(line, "mov [mem],[mem] not allowed"));
            }
        }
        _ => {
            if dst.kind != OperandKind::Reg {
                return Err(shape_error(line, "arith dst must be register"));
            }
        }
    }

    Ok(ParsedInstr {
        op,
        dst: Some(dst),
        src: Some(src),
    })
}

/// Parse one `_data` line.
pub fn parse_data_decl(text: &str, line: usize) -> Result<DataDecl> {
    let rest = text
        .get(..2)
        .filter(|prefix| prefix.eq_ignore_ascii_case("db"))
        .and_then(|_| text.get(2..))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .ok_or(AssemblerError::MalformedDb { line })?
        .trim();

    let (name, bracket) = rest
        .split_once('[')
        .ok_or(AssemblerError::MalformedDb { line })?;
    let size_token = bracket
        .strip_suffix(']')
        .ok_or(AssemblerError::MalformedDb { line })?
        .trim();

    let name = name.trim();
    if name.is_empty() || size_token.is_empty() {
        return Err(AssemblerError::MalformedDb { line });
    }

    let size = lexer::parse_number(size_token).ok_or_else(|| AssemblerError::BadNumber {
        line,
        token: size_token.to_string(),
    })?;

    Ok(DataDecl {
        line,
        name: name.to_string(),
        size,
    })
}
