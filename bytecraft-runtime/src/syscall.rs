//! Syscall dispatch.
//!
//! `r1` holds the syscall ID on entry and the return value on exit.
//! Buffer arguments are bounds-checked against the whole memory image
//! before any host I/O happens.

use bytecraft_spec::{flags, Register};

use crate::io::VmIo;
use crate::memory::Memory;
use crate::state::VmState;

/// Syscall identifiers.
pub mod syscall_ids {
    /// Halt the VM cleanly.
    pub const SC_EXIT: u32 = 0;
    /// Write `r4` bytes at `r3` to the fd in `r2`.
    pub const SC_WRITE: u32 = 1;
    /// Read up to `r4` bytes into `r3` from the fd in `r2`.
    pub const SC_READ: u32 = 2;
    /// Stub; always returns `0xFFFFFFFF`.
    pub const SC_OPEN: u32 = 3;
}

/// Handle the SYSCALL instruction. Unknown IDs fault with `BAD_INSTR`.
pub fn handle_syscall(state: &mut VmState, memory: &mut Memory, io: &mut VmIo) {
    let id = state.read_reg(Register::R1);

    match id {
        syscall_ids::SC_EXIT => state.halt(),
        syscall_ids::SC_WRITE => {
            let fd = state.read_reg(Register::R2);
            let buf = state.read_reg(Register::R3);
            let len = state.read_reg(Register::R4);

            if !memory.in_bounds(buf, len) {
                state.fault(flags::READ_OOB);
                return;
            }

            io.write(fd, memory.slice(buf, len));
            state.write_reg(Register::R1, len);
        }
        syscall_ids::SC_READ => {
            let fd = state.read_reg(Register::R2);
            let buf = state.read_reg(Register::R3);
            let len = state.read_reg(Register::R4);

            if !memory.in_bounds(buf, len) {
                state.fault(flags::WRITE_OOB);
                return;
            }

            let n = io.read(fd, memory.slice_mut(buf, len));
            state.write_reg(Register::R1, n as u32);
        }
        syscall_ids::SC_OPEN => {
            state.write_reg(Register::R1, 0xFFFF_FFFF);
        }
        _ => state.fault(flags::BAD_INSTR),
    }
}
