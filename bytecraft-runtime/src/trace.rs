//! Per-instruction diagnostic trace line.
//!
//! One line per executed instruction: the pre-instruction IP, the raw
//! opcode, every register, and the decoded flag names. Human-oriented;
//! the exact format is not a stable interface.

use bytecraft_spec::{flags, register_name, Register};

use crate::state::VmState;

/// Render the trace line for the instruction that just executed.
pub fn trace_line(state: &VmState, ip_before: u32, op: u8) -> String {
    use std::fmt::Write;

    let mut line = String::with_capacity(160);
    let _ = write!(line, "IP:{ip_before:08X} OP:{op:02X} |");
    for index in 0..8u8 {
        let _ = write!(
            line,
            " {}:{:08X}",
            register_name(index),
            state.read_index(index)
        );
    }
    let _ = write!(
        line,
        " IP:{:08X} rF:{:08X} rS:{}",
        state.ip(),
        state.flags(),
        state.read_reg(Register::Rs) & 1
    );
    let _ = write!(line, " [{}]", flags::describe(state.flags()));
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_line_contents() {
        let mut state = VmState::new(0x20);
        state.write_reg(Register::R3, 0xDEADBEEF);
        state.set_flags(flags::EQ | flags::TEST_TRUE);

        let line = trace_line(&state, 0x14, 0x05);

        assert!(line.starts_with("IP:00000014 OP:05 |"));
        assert!(line.contains("r3:DEADBEEF"));
        assert!(line.contains("rF:00000009"));
        assert!(line.contains("[EQ TEST]"));
    }
}
