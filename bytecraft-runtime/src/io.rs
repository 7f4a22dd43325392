//! Host I/O seam for the WRITE and READ syscalls.
//!
//! The VM assumes exclusive, synchronous access to the process streams
//! during a syscall. Tests swap in the buffered variant.

use std::io::{self, Read, Write};

/// Backing for the VM's I/O syscalls.
#[derive(Debug)]
pub enum VmIo {
    /// The real process stdin/stdout/stderr.
    Stdio,
    /// In-memory streams; `input` is consumed from the front.
    Captured {
        input: io::Cursor<Vec<u8>>,
        output: Vec<u8>,
        errors: Vec<u8>,
    },
}

impl VmIo {
    pub fn stdio() -> Self {
        VmIo::Stdio
    }

    /// Hermetic I/O with the given bytes queued on standard input.
    pub fn captured(input: Vec<u8>) -> Self {
        VmIo::Captured {
            input: io::Cursor::new(input),
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Write `bytes` to stderr when `fd == 2`, otherwise stdout.
    /// Host write failures are not observable by the guest.
    pub fn write(&mut self, fd: u32, bytes: &[u8]) {
        match self {
            VmIo::Stdio => {
                if fd == 2 {
                    let mut stderr = io::stderr().lock();
                    let _ = stderr.write_all(bytes);
                    let _ = stderr.flush();
                } else {
                    let mut stdout = io::stdout().lock();
                    let _ = stdout.write_all(bytes);
                    let _ = stdout.flush();
                }
            }
            VmIo::Captured { output, errors, .. } => {
                if fd == 2 {
                    errors.extend_from_slice(bytes);
                } else {
                    output.extend_from_slice(bytes);
                }
            }
        }
    }

    /// Fill `buf` from standard input (fd 0 only), stopping at EOF.
    /// Returns the number of bytes read; other fds read nothing.
    pub fn read(&mut self, fd: u32, buf: &mut [u8]) -> usize {
        if fd != 0 {
            return 0;
        }
        match self {
            VmIo::Stdio => read_up_to(io::stdin().lock(), buf),
            VmIo::Captured { input, .. } => read_up_to(input, buf),
        }
    }

    /// Bytes written to stdout so far (captured variant only).
    pub fn output(&self) -> &[u8] {
        match self {
            VmIo::Stdio => &[],
            VmIo::Captured { output, .. } => output,
        }
    }

    /// Bytes written to stderr so far (captured variant only).
    pub fn errors(&self) -> &[u8] {
        match self {
            VmIo::Stdio => &[],
            VmIo::Captured { errors, .. } => errors,
        }
    }
}

fn read_up_to<R: Read>(mut reader: R, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    filled
}
