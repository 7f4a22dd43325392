//! The fetch–decode–execute loop.
//!
//! Faults never surface as Rust errors: they raise a flag bit in `rF`
//! and move the VM to the halted state, and `run` returns normally. A
//! post-mortem consumer distinguishes a clean exit from a fault by
//! inspecting registers and flags (or the [`RunSummary`]).

use bytecraft_spec::{flags, split_mode, Module, Opcode, OperandKind, REG_COUNT};

use crate::io::VmIo;
use crate::memory::Memory;
use crate::state::{HaltSummary, VmState};
use crate::syscall::handle_syscall;
use crate::trace;

/// VM configuration.
#[derive(Debug, Clone, Default)]
pub struct VmConfig {
    /// Emit a diagnostic line to stderr after every instruction.
    pub trace: bool,
    /// Optional step cap for tests and tooling; `None` runs to halt.
    pub max_steps: Option<u64>,
}

/// Outcome of a `run` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed.
    pub steps: u64,
    pub halt: HaltSummary,
}

/// The ByteCraft virtual machine.
pub struct Vm {
    state: VmState,
    memory: Memory,
    io: VmIo,
    config: VmConfig,
}

impl Vm {
    /// Build a VM over the module's flat image (code followed by
    /// data), registers zeroed and `IP` at the entry point. The module
    /// is consumed; its byte runs become the memory image.
    pub fn new(module: Module, config: VmConfig) -> Self {
        Self::with_io(module, config, VmIo::stdio())
    }

    /// Same, with an explicit I/O backing (tests use the captured one).
    pub fn with_io(module: Module, config: VmConfig, io: VmIo) -> Self {
        let Module {
            entry_point,
            code,
            data,
        } = module;
        Vm {
            state: VmState::new(entry_point),
            memory: Memory::new(code, data),
            io,
            config,
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn io(&self) -> &VmIo {
        &self.io
    }

    /// Run until halt (or the configured step cap).
    pub fn run(&mut self) -> RunSummary {
        let mut steps: u64 = 0;
        while self.state.is_running() {
            if self.config.max_steps.is_some_and(|cap| steps >= cap) {
                return RunSummary {
                    steps,
                    halt: HaltSummary::StepLimit,
                };
            }
            self.step();
            steps += 1;
        }

        let halt = if self.state.exited_cleanly() {
            HaltSummary::CleanExit
        } else {
            HaltSummary::Fault
        };
        RunSummary { steps, halt }
    }

    /// Execute a single instruction.
    pub fn step(&mut self) {
        if self.state.ip() >= self.memory.code_size() {
            self.state.fault(flags::IP_OOB);
            return;
        }

        let ip_before = self.state.ip();
        // IP is inside the code region, so this fetch cannot fault.
        let op_byte = self.fetch8();

        match Opcode::from_u8(op_byte) {
            None => self.state.fault(flags::BAD_INSTR),
            Some(Opcode::Nop) => {}
            Some(Opcode::Mov) => self.exec_mov(),
            Some(op @ (Opcode::Add | Opcode::Sub | Opcode::Xor)) => self.exec_arith(op),
            Some(Opcode::Cmp) => self.exec_cmp(),
            Some(
                op @ (Opcode::Jmp | Opcode::Jeq | Opcode::Jneq | Opcode::Jla | Opcode::Jle),
            ) => self.exec_branch(op),
            Some(Opcode::Syscall) => {
                handle_syscall(&mut self.state, &mut self.memory, &mut self.io)
            }
        }

        if self.config.trace {
            eprintln!("{}", trace::trace_line(&self.state, ip_before, op_byte));
        }
    }

    // ========== Fetch primitives ==========

    /// Fetch one code byte at `IP` and advance. Faults `IP_OOB` and
    /// returns the 0 sentinel when `IP` has left the code region.
    fn fetch8(&mut self) -> u8 {
        let ip = self.state.ip();
        if ip >= self.memory.code_size() {
            self.state.fault(flags::IP_OOB);
            return 0;
        }
        let value = self.memory.byte(ip);
        self.state.set_ip(ip + 1);
        value
    }

    /// Fetch a little-endian u32 from the code stream.
    fn fetch32(&mut self) -> u32 {
        let ip = self.state.ip();
        if ip as u64 + 4 > self.memory.code_size() as u64 {
            self.state.fault(flags::IP_OOB);
            return 0;
        }
        let value = self.memory.read_u32(ip);
        self.state.set_ip(ip + 4);
        value
    }

    /// `fetch8` with the halt flag folded in, for operand decoding.
    fn fetch8_checked(&mut self) -> Option<u8> {
        let value = self.fetch8();
        self.state.is_running().then_some(value)
    }

    fn fetch32_checked(&mut self) -> Option<u32> {
        let value = self.fetch32();
        self.state.is_running().then_some(value)
    }

    /// Fetch a register-index byte, faulting on an out-of-range index.
    fn fetch_reg(&mut self) -> Option<u8> {
        let index = self.fetch8_checked()?;
        if index as usize >= REG_COUNT {
            self.state.fault(flags::BAD_INSTR);
            return None;
        }
        Some(index)
    }

    // ========== Data-memory primitives ==========

    fn oob_read(&mut self, addr: u32, n: u32) -> bool {
        if self.memory.in_bounds(addr, n) {
            false
        } else {
            self.state.fault(flags::READ_OOB);
            true
        }
    }

    fn oob_write(&mut self, addr: u32, n: u32) -> bool {
        if self.memory.in_bounds(addr, n) {
            false
        } else {
            self.state.fault(flags::WRITE_OOB);
            true
        }
    }

    fn load32(&mut self, addr: u32) -> Option<u32> {
        if self.oob_read(addr, 4) {
            return None;
        }
        Some(self.memory.read_u32(addr))
    }

    fn store32(&mut self, addr: u32, value: u32) {
        if self.oob_write(addr, 4) {
            return;
        }
        self.memory.write_u32(addr, value);
    }

    /// Decode and fetch a source value of kind `REG`, `IMM`, or `MEM`.
    /// Anything else is a `BAD_INSTR` fault.
    fn src_value(&mut self, src_nibble: u8) -> Option<u32> {
        match OperandKind::from_nibble(src_nibble) {
            Some(OperandKind::Reg) => {
                let index = self.fetch_reg()?;
                Some(self.state.read_index(index))
            }
            Some(OperandKind::Imm) => self.fetch32_checked(),
            Some(OperandKind::Mem) => {
                let addr = self.fetch32_checked()?;
                self.load32(addr)
            }
            _ => {
                self.state.fault(flags::BAD_INSTR);
                None
            }
        }
    }

    // ========== Instruction execution ==========

    fn exec_mov(&mut self) {
        let Some(mode) = self.fetch8_checked() else {
            return;
        };
        let (dst_nibble, src_nibble) = split_mode(mode);

        match OperandKind::from_nibble(dst_nibble) {
            Some(OperandKind::Reg) => {
                let Some(dst_reg) = self.fetch_reg() else {
                    return;
                };
                let Some(value) = self.src_value(src_nibble) else {
                    return;
                };
                self.state.write_index(dst_reg, value);
            }
            Some(OperandKind::Mem) => {
                let Some(addr) = self.fetch32_checked() else {
                    return;
                };
                let value = match OperandKind::from_nibble(src_nibble) {
                    Some(OperandKind::Reg) => {
                        let Some(index) = self.fetch_reg() else {
                            return;
                        };
                        self.state.read_index(index)
                    }
                    Some(OperandKind::Imm) => {
                        let Some(value) = self.fetch32_checked() else {
                            return;
                        };
                        value
                    }
                    // A memory source with a memory destination never
                    // assembles and does not decode.
                    _ => {
                        self.state.fault(flags::BAD_INSTR);
                        return;
                    }
                };
                self.store32(addr, value);
            }
            _ => self.state.fault(flags::BAD_INSTR),
        }
    }

    fn exec_arith(&mut self, op: Opcode) {
        let Some(mode) = self.fetch8_checked() else {
            return;
        };
        let (dst_nibble, src_nibble) = split_mode(mode);

        if OperandKind::from_nibble(dst_nibble) != Some(OperandKind::Reg) {
            self.state.fault(flags::BAD_INSTR);
            return;
        }
        let Some(dst_reg) = self.fetch_reg() else {
            return;
        };
        let Some(rhs) = self.src_value(src_nibble) else {
            return;
        };

        let lhs = self.state.read_index(dst_reg);
        let result = match op {
            Opcode::Add => lhs.wrapping_add(rhs),
            Opcode::Sub => lhs.wrapping_sub(rhs),
            _ => lhs ^ rhs,
        };
        self.state.write_index(dst_reg, result);
    }

    fn exec_cmp(&mut self) {
        let Some(mode) = self.fetch8_checked() else {
            return;
        };
        let (dst_nibble, src_nibble) = split_mode(mode);

        if OperandKind::from_nibble(dst_nibble) != Some(OperandKind::Reg) {
            self.state.fault(flags::BAD_INSTR);
            return;
        }
        let Some(lhs_reg) = self.fetch_reg() else {
            return;
        };
        let lhs = self.state.read_index(lhs_reg);
        let Some(rhs) = self.src_value(src_nibble) else {
            return;
        };

        self.set_compare_flags(lhs, rhs);
    }

    /// Clear EQ/GT/LT, then set exactly one of them. Bit 0 of `rS`
    /// selects signed interpretation.
    fn set_compare_flags(&mut self, lhs: u32, rhs: u32) {
        self.state.clear_flags(flags::COMPARE_MASK);
        let flag = if self.state.signed_mode() {
            let (a, b) = (lhs as i32, rhs as i32);
            if a == b {
                flags::EQ
            } else if a > b {
                flags::GT
            } else {
                flags::LT
            }
        } else if lhs == rhs {
            flags::EQ
        } else if lhs > rhs {
            flags::GT
        } else {
            flags::LT
        };
        self.state.set_flags(flag);
    }

    fn exec_branch(&mut self, op: Opcode) {
        let Some(mode) = self.fetch8_checked() else {
            return;
        };
        // Branch destinations are always NONE; only the source nibble
        // matters.
        let (_, src_nibble) = split_mode(mode);

        let target = match OperandKind::from_nibble(src_nibble) {
            Some(OperandKind::Imm) => {
                let Some(value) = self.fetch32_checked() else {
                    return;
                };
                value
            }
            Some(OperandKind::Reg) => {
                let Some(index) = self.fetch_reg() else {
                    return;
                };
                self.state.read_index(index)
            }
            _ => {
                self.state.fault(flags::BAD_INSTR);
                return;
            }
        };

        let current = self.state.flags();
        let take = match op {
            Opcode::Jmp => true,
            Opcode::Jeq => current & flags::EQ != 0,
            Opcode::Jneq => current & flags::EQ == 0,
            Opcode::Jla => current & flags::GT != 0,
            _ => current & (flags::LT | flags::EQ) != 0,
        };

        if take {
            self.state.set_flags(flags::TEST_TRUE);
            self.state.set_ip(target);
        } else {
            self.state.clear_flags(flags::TEST_TRUE);
        }
    }
}
