//! Encoding-closure tests: the decoder consumes exactly the bytes the
//! assembler emits, instruction by instruction.

use bytecraft_assembler::assemble;
use bytecraft_disassembler::{decode_at, disassemble};
use bytecraft_spec::{Instruction, Opcode, Operand};
use proptest::prelude::*;

#[test]
fn test_decoder_walks_assembled_program_exactly() {
    let source = concat!(
        "_main:\n",
        "    nop\n",
        "    mov r1, 10\n",
        "  again:\n",
        "    sub r1, 1\n",
        "    mov [buf], r1\n",
        "    cmp r1, 0\n",
        "    jneq again\n",
        "    mov r2, [buf]\n",
        "    jmp r2\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB buf[4]\n",
    );
    let module = assemble(source).unwrap();

    let mut offset = 0;
    let mut count = 0;
    while offset < module.code.len() {
        let (instr, consumed) = decode_at(&module.code, offset).unwrap();
        assert_eq!(consumed, instr.encoded_len(), "at offset {offset}");
        offset += consumed;
        count += 1;
    }

    assert_eq!(offset, module.code.len());
    assert_eq!(count, 10);
}

#[test]
fn test_listing_covers_whole_region() {
    let source = "_main:\n    mov r1, 1\n    add r1, r1\n    syscall\n";
    let module = assemble(source).unwrap();

    let lines = disassemble(&module.code).unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("0000: mov r1"));
    assert!(lines[2].ends_with("syscall"));
}

fn any_reg() -> impl Strategy<Value = Operand> {
    (0u8..11).prop_map(Operand::Register)
}

fn any_imm() -> impl Strategy<Value = Operand> {
    any::<u32>().prop_map(Operand::Immediate)
}

fn any_mem() -> impl Strategy<Value = Operand> {
    any::<u32>().prop_map(Operand::MemAbs)
}

/// Every instruction shape the assembler can legally produce.
fn legal_instruction() -> impl Strategy<Value = Instruction> {
    let arith_or_cmp = prop_oneof![
        Just(Opcode::Add),
        Just(Opcode::Sub),
        Just(Opcode::Xor),
        Just(Opcode::Cmp),
    ];
    let branch = prop_oneof![
        Just(Opcode::Jmp),
        Just(Opcode::Jeq),
        Just(Opcode::Jneq),
        Just(Opcode::Jla),
        Just(Opcode::Jle),
    ];

    prop_oneof![
        Just(Instruction::new(Opcode::Nop, Operand::None, Operand::None)),
        Just(Instruction::new(Opcode::Syscall, Operand::None, Operand::None)),
        (any_reg(), prop_oneof![any_reg(), any_imm(), any_mem()])
            .prop_map(|(dst, src)| Instruction::new(Opcode::Mov, dst, src)),
        (any_mem(), prop_oneof![any_reg(), any_imm()])
            .prop_map(|(dst, src)| Instruction::new(Opcode::Mov, dst, src)),
        (arith_or_cmp, any_reg(), prop_oneof![any_reg(), any_imm(), any_mem()])
            .prop_map(|(op, dst, src)| Instruction::new(op, dst, src)),
        (branch, prop_oneof![any_reg(), any_imm()])
            .prop_map(|(op, src)| Instruction::new(op, Operand::None, src)),
    ]
}

proptest! {
    /// encode -> decode is the identity, and the decoder's consumption
    /// equals the encoder's size.
    #[test]
    fn decode_reverses_encode(instr in legal_instruction()) {
        let mut code = Vec::new();
        instr.encode_into(&mut code);

        let (decoded, consumed) = decode_at(&code, 0).unwrap();
        prop_assert_eq!(consumed, code.len());
        prop_assert_eq!(decoded, instr);
    }

    /// Decoding a legal instruction embedded at a nonzero offset
    /// consumes the same byte count.
    #[test]
    fn decode_is_position_independent(instr in legal_instruction(), pad in 0usize..8) {
        let mut code = vec![0u8; pad];
        instr.encode_into(&mut code);

        let (decoded, consumed) = decode_at(&code, pad).unwrap();
        prop_assert_eq!(consumed, instr.encoded_len());
        prop_assert_eq!(decoded, instr);
    }
}
