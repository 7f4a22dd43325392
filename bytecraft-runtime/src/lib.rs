//! ByteCraft virtual machine.
//!
//! Loads a module into a flat memory image (code followed by data) and
//! interprets it instruction by instruction. Faults are reported
//! in band through the flag bits of `rF` and leave the VM halted; `run`
//! never returns an error to its caller.

pub mod io;
pub mod memory;
pub mod state;
pub mod syscall;
pub mod trace;
pub mod vm;

pub use io::VmIo;
pub use memory::Memory;
pub use state::{HaltSummary, VmState};
pub use vm::{RunSummary, Vm, VmConfig};

/// Load a module and run it to halt with the default configuration.
pub fn run(module: bytecraft_spec::Module) -> RunSummary {
    Vm::new(module, VmConfig::default()).run()
}
