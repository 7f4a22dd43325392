//! Flag bits in the low byte of `rF`.
//!
//! Bits outside the low byte are reserved; operations that edit flags
//! selectively must preserve them.

/// Comparison: operands equal.
pub const EQ: u32 = 1 << 0;
/// Comparison: left operand greater.
pub const GT: u32 = 1 << 1;
/// Comparison: left operand less.
pub const LT: u32 = 1 << 2;
/// Last branch predicate evaluated true.
pub const TEST_TRUE: u32 = 1 << 3;
/// Undecodable opcode, operand kind, register index, or syscall ID.
pub const BAD_INSTR: u32 = 1 << 4;
/// Instruction fetch left the code region.
pub const IP_OOB: u32 = 1 << 5;
/// Data read outside the memory image.
pub const READ_OOB: u32 = 1 << 6;
/// Data write outside the memory image.
pub const WRITE_OOB: u32 = 1 << 7;

/// Bits cleared by `CMP` before setting exactly one of them.
pub const COMPARE_MASK: u32 = EQ | GT | LT;

/// Bits that force the VM out of the running state when raised.
pub const FAULT_MASK: u32 = BAD_INSTR | IP_OOB | READ_OOB | WRITE_OOB;

/// Decode the named flag bits for diagnostics, e.g. `"EQ TEST"`.
pub fn describe(flags: u32) -> String {
    let names = [
        (EQ, "EQ"),
        (GT, "GT"),
        (LT, "LT"),
        (TEST_TRUE, "TEST"),
        (BAD_INSTR, "BAD"),
        (IP_OOB, "IP_OOB"),
        (READ_OOB, "R_OOB"),
        (WRITE_OOB, "W_OOB"),
    ];
    names
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout() {
        assert_eq!(EQ, 0x01);
        assert_eq!(GT, 0x02);
        assert_eq!(LT, 0x04);
        assert_eq!(TEST_TRUE, 0x08);
        assert_eq!(BAD_INSTR, 0x10);
        assert_eq!(IP_OOB, 0x20);
        assert_eq!(READ_OOB, 0x40);
        assert_eq!(WRITE_OOB, 0x80);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(0), "");
        assert_eq!(describe(EQ | TEST_TRUE), "EQ TEST");
        assert_eq!(describe(WRITE_OOB), "W_OOB");
        // Reserved high bits are not named.
        assert_eq!(describe(0xFF00_0000), "");
    }
}
