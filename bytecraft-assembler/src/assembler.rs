//! The two-pass assembly driver.
//!
//! Pass one walks the preprocessed lines to size the code region,
//! validate instruction shapes, and capture symbols. Layout
//! finalization then binds each data name to `code_size` plus its
//! running offset. Pass two walks the lines again and emits bytes,
//! resolving symbols as it goes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bytecraft_spec::{Instruction, Module, Operand, OperandKind};

use crate::error::{AssemblerError, Result};
use crate::lexer::{self, SourceLine};
use crate::parser::{self, DataDecl, OperandToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Main,
    Data,
}

fn section_of(line: &SourceLine) -> Option<Section> {
    match line.text.as_str() {
        "_main:" => Some(Section::Main),
        "_data:" => Some(Section::Data),
        _ => None,
    }
}

/// Assemble source text into a module.
///
/// The entry point is always 0 (start of code). A source with no
/// `_main:` section assembles to a zero-length code region.
pub fn assemble(source: &str) -> Result<Module> {
    let lines = lexer::preprocess(source);

    // Pass one: sizing, shape validation, symbol capture.
    let mut code_symbols: HashMap<String, u32> = HashMap::new();
    let mut data_decls: Vec<DataDecl> = Vec::new();
    let mut section = Section::None;
    let mut code_pc: u32 = 0;

    for line in &lines {
        if let Some(next) = section_of(line) {
            section = next;
            continue;
        }

        match section {
            Section::None => return Err(AssemblerError::BadSection { line: line.number }),
            Section::Main => {
                if let Some(raw_label) = line.text.strip_suffix(':') {
                    let label = raw_label.trim();
                    if label.is_empty() {
                        return Err(AssemblerError::EmptyLabel { line: line.number });
                    }
                    if code_symbols.contains_key(label)
                        || data_decls.iter().any(|decl| decl.name == label)
                    {
                        return Err(AssemblerError::DuplicateLabel {
                            line: line.number,
                            label: label.to_string(),
                        });
                    }
                    code_symbols.insert(label.to_string(), code_pc);
                } else {
                    let instr = parser::parse_instruction(&line.text, line.number)?;
                    code_pc = code_pc.wrapping_add(instr.encoded_len() as u32);
                }
            }
            Section::Data => {
                let decl = parser::parse_data_decl(&line.text, line.number)?;
                if code_symbols.contains_key(&decl.name)
                    || data_decls.iter().any(|existing| existing.name == decl.name)
                {
                    return Err(AssemblerError::DuplicateData {
                        line: line.number,
                        name: decl.name,
                    });
                }
                data_decls.push(decl);
            }
        }
    }

    // Layout finalization: data symbols become absolute addresses past
    // the code region, in declaration order.
    let code_size = code_pc;
    let mut data_symbols: HashMap<String, u32> = HashMap::new();
    let mut data_size: u32 = 0;
    for decl in &data_decls {
        data_symbols.insert(decl.name.clone(), code_size.wrapping_add(data_size));
        data_size = data_size.wrapping_add(decl.size);
    }

    // Pass two: emission.
    let mut code: Vec<u8> = Vec::with_capacity(code_size as usize);
    let mut section = Section::None;

    for line in &lines {
        if let Some(next) = section_of(line) {
            section = next;
            continue;
        }
        if section != Section::Main || line.text.ends_with(':') {
            continue;
        }

        let parsed = parser::parse_instruction(&line.text, line.number)?;
        let instr = Instruction::new(
            parsed.op,
            lower_operand(parsed.dst.as_ref(), &code_symbols, &data_symbols, line.number)?,
            lower_operand(parsed.src.as_ref(), &code_symbols, &data_symbols, line.number)?,
        );
        instr.encode_into(&mut code);
    }

    debug_assert_eq!(code.len(), code_size as usize);

    Ok(Module::new(0, code, data_size))
}

/// Assemble a source file on disk.
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Module> {
    let source = fs::read_to_string(path)?;
    assemble(&source)
}

/// Resolve an operand token to a value: number, then code label, then
/// data name.
fn resolve(
    token: &str,
    code_symbols: &HashMap<String, u32>,
    data_symbols: &HashMap<String, u32>,
    line: usize,
) -> Result<u32> {
    if let Some(value) = lexer::parse_number(token) {
        return Ok(value);
    }
    if let Some(&offset) = code_symbols.get(token) {
        return Ok(offset);
    }
    if let Some(&address) = data_symbols.get(token) {
        return Ok(address);
    }
    Err(AssemblerError::UnknownSymbol {
        line,
        symbol: token.to_string(),
    })
}

fn lower_operand(
    token: Option<&OperandToken>,
    code_symbols: &HashMap<String, u32>,
    data_symbols: &HashMap<String, u32>,
    line: usize,
) -> Result<Operand> {
    let Some(token) = token else {
        return Ok(Operand::None);
    };

    match token.kind {
        OperandKind::None => Ok(Operand::None),
        OperandKind::Reg => {
            let register =
                lexer::parse_register(&token.text).ok_or_else(|| AssemblerError::BadOperandShape {
                    line,
                    message: "expected register".to_string(),
                })?;
            Ok(Operand::Register(register.index() as u8))
        }
        OperandKind::Imm => Ok(Operand::Immediate(resolve(
            &token.text,
            code_symbols,
            data_symbols,
            line,
        )?)),
        OperandKind::Mem => {
            let inner =
                lexer::mem_inner(&token.text).ok_or_else(|| AssemblerError::BadOperandShape {
                    line,
                    message: "expected [mem]".to_string(),
                })?;
            Ok(Operand::MemAbs(resolve(
                inner,
                code_symbols,
                data_symbols,
                line,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_empty_source() {
        let module = assemble("").unwrap();
        assert_eq!(module.entry_point, 0);
        assert!(module.code.is_empty());
        assert!(module.data.is_empty());
    }

    #[test]
    fn test_assemble_no_main_is_zero_code() {
        let module = assemble("; nothing but comments\n").unwrap();
        assert!(module.code.is_empty());
    }

    #[test]
    fn test_label_binds_to_code_offset() {
        let source = "_main:\n    nop\n  loop:\n    jmp loop\n";
        let module = assemble(source).unwrap();

        // nop (1 byte), then jmp at offset 1 targeting offset 1.
        assert_eq!(module.code[0], 0x00);
        assert_eq!(module.code[1], 0x06);
        assert_eq!(module.code[2], 0x02);
        assert_eq!(&module.code[3..7], &1u32.to_le_bytes());
    }

    #[test]
    fn test_data_symbols_follow_code() {
        let source = "_main:\n    mov r1, buf\n_data:\n    DB pad[8]\n    DB buf[4]\n";
        let module = assemble(source).unwrap();

        // mov r1, imm is 7 bytes of code; pad is at 7, buf at 7 + 8.
        assert_eq!(module.code.len(), 7);
        assert_eq!(module.data.len(), 12);
        assert_eq!(&module.code[3..7], &15u32.to_le_bytes());
    }

    #[test]
    fn test_forward_label_reference() {
        let source = "_main:\n    jmp end\n    nop\n  end:\n    syscall\n";
        let module = assemble(source).unwrap();

        // jmp is 6 bytes, nop 1, so `end` is offset 7.
        assert_eq!(&module.code[2..6], &7u32.to_le_bytes());
    }

    #[test]
    fn test_content_before_section_is_fatal() {
        let err = assemble("nop\n_main:\n").unwrap_err();
        assert!(matches!(err, AssemblerError::BadSection { line: 1 }));
    }

    #[test]
    fn test_duplicate_label() {
        let source = "_main:\n  L:\n    nop\n  L:\n    nop\n";
        let err = assemble(source).unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::DuplicateLabel { line: 4, .. }
        ));
    }

    #[test]
    fn test_duplicate_data_name() {
        let source = "_main:\n_data:\n    DB x[1]\n    DB x[2]\n";
        let err = assemble(source).unwrap_err();
        assert!(matches!(err, AssemblerError::DuplicateData { line: 4, .. }));
    }

    #[test]
    fn test_name_shared_across_namespaces_is_fatal() {
        let source = "_main:\n  x:\n    nop\n_data:\n    DB x[1]\n";
        assert!(matches!(
            assemble(source).unwrap_err(),
            AssemblerError::DuplicateData { line: 5, .. }
        ));

        let source = "_data:\n    DB x[1]\n_main:\n  x:\n    nop\n";
        assert!(matches!(
            assemble(source).unwrap_err(),
            AssemblerError::DuplicateLabel { line: 4, .. }
        ));
    }

    #[test]
    fn test_unknown_symbol_reports_line() {
        let source = "_main:\n    nop\n    mov r1, missing\n";
        let err = assemble(source).unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::UnknownSymbol { line: 3, .. }
        ));
    }

    #[test]
    fn test_mem_operand_numeric_and_symbolic() {
        let source = "_main:\n    mov [0x10], r1\n    mov r2, [buf]\n_data:\n    DB buf[4]\n";
        let module = assemble(source).unwrap();

        // First: op, mode 0x31, addr 0x10 LE, reg 0.
        assert_eq!(&module.code[0..2], &[0x01, 0x31]);
        assert_eq!(&module.code[2..6], &0x10u32.to_le_bytes());
        assert_eq!(module.code[6], 0x00);

        // Second: op, mode 0x13, reg 1, addr = code_size (14).
        assert_eq!(&module.code[7..9], &[0x01, 0x13]);
        assert_eq!(module.code[9], 0x01);
        assert_eq!(&module.code[10..14], &14u32.to_le_bytes());
    }

    #[test]
    fn test_empty_label_is_fatal() {
        let err = assemble("_main:\n  :\n").unwrap_err();
        assert!(matches!(err, AssemblerError::EmptyLabel { line: 2 }));
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let source = "_main:\n  Loop:\n    jmp loop\n";
        assert!(matches!(
            assemble(source).unwrap_err(),
            AssemblerError::UnknownSymbol { .. }
        ));
    }
}
