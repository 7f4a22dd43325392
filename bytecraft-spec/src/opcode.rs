//! Opcode definitions.
//!
//! The numeric identities are fixed by the on-disk format and must not
//! be renumbered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode (one byte on the wire).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// No operation.
    Nop = 0,
    /// Move between registers, immediates, and absolute memory.
    Mov = 1,
    /// Wrapping 32-bit addition into a register.
    Add = 2,
    /// Wrapping 32-bit subtraction into a register.
    Sub = 3,
    /// Bitwise exclusive or into a register.
    Xor = 4,
    /// Compare and set EQ/GT/LT, honoring the `rS` sign mode.
    Cmp = 5,
    /// Unconditional jump.
    Jmp = 6,
    /// Jump if EQ.
    Jeq = 7,
    /// Jump if not EQ.
    Jneq = 8,
    /// Jump if GT.
    Jla = 9,
    /// Jump if LT or EQ.
    Jle = 10,
    /// Host call dispatched on `r1`.
    Syscall = 11,
}

impl Opcode {
    /// Try to convert a raw opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Opcode::Nop),
            1 => Some(Opcode::Mov),
            2 => Some(Opcode::Add),
            3 => Some(Opcode::Sub),
            4 => Some(Opcode::Xor),
            5 => Some(Opcode::Cmp),
            6 => Some(Opcode::Jmp),
            7 => Some(Opcode::Jeq),
            8 => Some(Opcode::Jneq),
            9 => Some(Opcode::Jla),
            10 => Some(Opcode::Jle),
            11 => Some(Opcode::Syscall),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a mnemonic token (case-insensitive).
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        match lower.as_str() {
            "nop" => Some(Opcode::Nop),
            "mov" => Some(Opcode::Mov),
            "add" => Some(Opcode::Add),
            "sub" => Some(Opcode::Sub),
            "xor" => Some(Opcode::Xor),
            "cmp" => Some(Opcode::Cmp),
            "jmp" => Some(Opcode::Jmp),
            "jeq" => Some(Opcode::Jeq),
            "jneq" => Some(Opcode::Jneq),
            "jla" => Some(Opcode::Jla),
            "jle" => Some(Opcode::Jle),
            "syscall" => Some(Opcode::Syscall),
            _ => None,
        }
    }

    /// Bare instructions encode as a single opcode byte with no mode.
    #[inline]
    pub const fn is_bare(self) -> bool {
        matches!(self, Opcode::Nop | Opcode::Syscall)
    }

    /// Branches encode only a source operand.
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::Jmp | Opcode::Jeq | Opcode::Jneq | Opcode::Jla | Opcode::Jle
        )
    }

    /// Register-destination arithmetic (ADD, SUB, XOR).
    #[inline]
    pub const fn is_arith(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Sub | Opcode::Xor)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Nop => "nop",
            Opcode::Mov => "mov",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Xor => "xor",
            Opcode::Cmp => "cmp",
            Opcode::Jmp => "jmp",
            Opcode::Jeq => "jeq",
            Opcode::Jneq => "jneq",
            Opcode::Jla => "jla",
            Opcode::Jle => "jle",
            Opcode::Syscall => "syscall",
        };
        write!(f, "{}", name)
    }
}
