//! Operand kinds and the closed operand variant shared by the encoder
//! and the decoder.

use serde::{Deserialize, Serialize};

/// Addressing kind of an operand; one 4-bit nibble in the mode byte.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// Operand slot unused (branch destinations, bare instructions).
    None = 0,
    /// Register index, one payload byte.
    Reg = 1,
    /// 32-bit immediate, four little-endian payload bytes.
    Imm = 2,
    /// Absolute memory address, four little-endian payload bytes.
    Mem = 3,
}

impl OperandKind {
    /// Try to convert a raw mode nibble.
    pub fn from_nibble(value: u8) -> Option<Self> {
        match value {
            0 => Some(OperandKind::None),
            1 => Some(OperandKind::Reg),
            2 => Some(OperandKind::Imm),
            3 => Some(OperandKind::Mem),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_nibble(self) -> u8 {
        self as u8
    }

    /// Encoded payload size in bytes.
    pub const fn encoded_size(self) -> usize {
        match self {
            OperandKind::None => 0,
            OperandKind::Reg => 1,
            OperandKind::Imm => 4,
            OperandKind::Mem => 4,
        }
    }
}

/// A fully resolved operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    None,
    Register(u8),
    Immediate(u32),
    MemAbs(u32),
}

impl Operand {
    pub const fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Register(_) => OperandKind::Reg,
            Operand::Immediate(_) => OperandKind::Imm,
            Operand::MemAbs(_) => OperandKind::Mem,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_roundtrip() {
        for value in 0..=3u8 {
            let kind = OperandKind::from_nibble(value).unwrap();
            assert_eq!(kind.to_nibble(), value);
        }
        assert_eq!(OperandKind::from_nibble(4), None);
        assert_eq!(OperandKind::from_nibble(0xF), None);
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(OperandKind::None.encoded_size(), 0);
        assert_eq!(OperandKind::Reg.encoded_size(), 1);
        assert_eq!(OperandKind::Imm.encoded_size(), 4);
        assert_eq!(OperandKind::Mem.encoded_size(), 4);
    }

    #[test]
    fn test_operand_kind() {
        assert_eq!(Operand::None.kind(), OperandKind::None);
        assert_eq!(Operand::Register(3).kind(), OperandKind::Reg);
        assert_eq!(Operand::Immediate(0xDEADBEEF).kind(), OperandKind::Imm);
        assert_eq!(Operand::MemAbs(16).kind(), OperandKind::Mem);
    }
}
