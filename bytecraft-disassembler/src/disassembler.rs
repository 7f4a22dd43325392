//! Listing generation over a code region.

use bytecraft_spec::{register_name, Instruction, Operand};

use crate::decoder::decode_at;
use crate::error::DecodeError;

/// Render one instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.op.to_string();

    if instr.op.is_bare() {
        return mnemonic;
    }
    if instr.op.is_branch() {
        return format!("{} {}", mnemonic, format_operand(&instr.src));
    }
    format!(
        "{} {}, {}",
        mnemonic,
        format_operand(&instr.dst),
        format_operand(&instr.src)
    )
}

fn format_operand(operand: &Operand) -> String {
    match operand {
        Operand::None => String::new(),
        Operand::Register(index) => register_name(*index).to_string(),
        Operand::Immediate(value) => format!("{:#x}", value),
        Operand::MemAbs(address) => format!("[{:#x}]", address),
    }
}

/// Disassemble a whole code region into listing lines of the form
/// `0007: jmp 0x0`.
pub fn disassemble(code: &[u8]) -> Result<Vec<String>, DecodeError> {
    let mut lines = Vec::new();
    let mut offset = 0;
    while offset < code.len() {
        let (instr, consumed) = decode_at(code, offset)?;
        lines.push(format!("{:04X}: {}", offset, format_instruction(&instr)));
        offset += consumed;
    }
    Ok(lines)
}
