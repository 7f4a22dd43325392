//! Register definitions for the ByteCraft machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of architectural registers.
pub const REG_COUNT: usize = 11;

/// Architectural register, addressed by a compact index.
///
/// All registers are 32-bit unsigned. `rS` is semantically 1-bit: only
/// bit 0 is meaningful and writes must mask to `value & 1`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
    /// Instruction pointer.
    Ip = 8,
    /// Flags register; comparison and fault bits live in the low byte.
    Rf = 9,
    /// Sign-mode register; bit 0 selects signed comparison.
    Rs = 10,
}

impl Register {
    /// Try to convert a raw index from the instruction stream.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Register::R1),
            1 => Some(Register::R2),
            2 => Some(Register::R3),
            3 => Some(Register::R4),
            4 => Some(Register::R5),
            5 => Some(Register::R6),
            6 => Some(Register::R7),
            7 => Some(Register::R8),
            8 => Some(Register::Ip),
            9 => Some(Register::Rf),
            10 => Some(Register::Rs),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parse an assembly register token: `r1..r8`, `ip`, `rf`, `rs`
    /// (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "r1" => Some(Register::R1),
            "r2" => Some(Register::R2),
            "r3" => Some(Register::R3),
            "r4" => Some(Register::R4),
            "r5" => Some(Register::R5),
            "r6" => Some(Register::R6),
            "r7" => Some(Register::R7),
            "r8" => Some(Register::R8),
            "ip" => Some(Register::Ip),
            "rf" => Some(Register::Rf),
            "rs" => Some(Register::Rs),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::R6 => "r6",
            Register::R7 => "r7",
            Register::R8 => "r8",
            Register::Ip => "IP",
            Register::Rf => "rF",
            Register::Rs => "rS",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Human-readable name for a raw register index, for diagnostics.
pub fn register_name(index: u8) -> &'static str {
    match Register::from_index(index) {
        Some(reg) => reg.name(),
        None => "??",
    }
}
