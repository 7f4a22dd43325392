//! Syscall behavior through complete assembled programs.

use bytecraft_assembler::assemble;
use bytecraft_runtime::{HaltSummary, Vm, VmConfig, VmIo};
use bytecraft_spec::{flags, Register};

fn vm_with_input(source: &str, input: &[u8]) -> Vm {
    let module = assemble(source).expect("assembly failed");
    Vm::with_io(module, VmConfig::default(), VmIo::captured(input.to_vec()))
}

#[test]
fn test_write_to_stdout() {
    // Store "Hi!\0" into the data buffer, then write 3 bytes of it.
    let source = concat!(
        "_main:\n",
        "    mov [msg], 0x00216948\n",
        "    mov r1, 1\n",
        "    mov r2, 1\n",
        "    mov r3, msg\n",
        "    mov r4, 3\n",
        "    syscall\n",
        "    mov r5, r1\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB msg[4]\n",
    );
    let mut vm = vm_with_input(source, b"");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::CleanExit);
    assert_eq!(vm.io().output(), b"Hi!");
    assert!(vm.io().errors().is_empty());
    // WRITE returns the byte count in r1.
    assert_eq!(vm.state().read_reg(Register::R5), 3);
}

#[test]
fn test_write_fd2_to_stderr() {
    let source = concat!(
        "_main:\n",
        "    mov [msg], 0x0A6B6F21\n",
        "    mov r1, 1\n",
        "    mov r2, 2\n",
        "    mov r3, msg\n",
        "    mov r4, 4\n",
        "    syscall\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB msg[4]\n",
    );
    let mut vm = vm_with_input(source, b"");
    vm.run();

    assert_eq!(vm.io().errors(), b"!ok\n");
    assert!(vm.io().output().is_empty());
}

#[test]
fn test_read_fills_buffer_and_returns_count() {
    let source = concat!(
        "_main:\n",
        "    mov r1, 2\n",
        "    mov r2, 0\n",
        "    mov r3, buf\n",
        "    mov r4, 8\n",
        "    syscall\n",
        "    mov r5, r1\n",
        "    mov r6, [buf]\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB buf[8]\n",
    );
    let mut vm = vm_with_input(source, b"abcd");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::CleanExit);
    assert_eq!(vm.state().read_reg(Register::R5), 4);
    assert_eq!(vm.state().read_reg(Register::R6), u32::from_le_bytes(*b"abcd"));
}

#[test]
fn test_read_from_other_fd_returns_zero() {
    let source = concat!(
        "_main:\n",
        "    mov r1, 2\n",
        "    mov r2, 3\n",
        "    mov r3, buf\n",
        "    mov r4, 8\n",
        "    syscall\n",
        "    mov r5, r1\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB buf[8]\n",
    );
    let mut vm = vm_with_input(source, b"ignored");
    vm.run();

    assert_eq!(vm.state().read_reg(Register::R5), 0);
}

#[test]
fn test_open_stub_returns_all_ones() {
    let source = concat!(
        "_main:\n",
        "    mov r1, 3\n",
        "    syscall\n",
        "    mov r5, r1\n",
        "    mov r1, 0\n",
        "    syscall\n",
    );
    let mut vm = vm_with_input(source, b"");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::CleanExit);
    assert_eq!(vm.state().read_reg(Register::R5), 0xFFFF_FFFF);
}

#[test]
fn test_unknown_syscall_faults() {
    let source = "_main:\n    mov r1, 42\n    syscall\n";
    let mut vm = vm_with_input(source, b"");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::Fault);
    assert_eq!(vm.state().flags() & flags::BAD_INSTR, flags::BAD_INSTR);
}

#[test]
fn test_write_with_oob_buffer_faults_before_io() {
    let source = concat!(
        "_main:\n",
        "    mov r1, 1\n",
        "    mov r2, 1\n",
        "    mov r3, 0xFFFFFF00\n",
        "    mov r4, 64\n",
        "    syscall\n",
    );
    let mut vm = vm_with_input(source, b"");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::Fault);
    assert_eq!(vm.state().flags() & flags::READ_OOB, flags::READ_OOB);
    assert!(vm.io().output().is_empty());
}

#[test]
fn test_write_zero_bytes() {
    let source = concat!(
        "_main:\n",
        "    mov r1, 1\n",
        "    mov r2, 1\n",
        "    mov r3, buf\n",
        "    mov r4, 0\n",
        "    syscall\n",
        "    mov r1, 0\n",
        "    syscall\n",
        "_data:\n",
        "    DB buf[4]\n",
    );
    let mut vm = vm_with_input(source, b"");
    let summary = vm.run();

    assert_eq!(summary.halt, HaltSummary::CleanExit);
    assert!(vm.io().output().is_empty());
}
