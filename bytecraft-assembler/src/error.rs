//! Error types for the ByteCraft assembler.
//!
//! Every user-facing variant carries the one-based source line number.
//! Assembly is all-or-nothing; no partial module accompanies an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("cannot open source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("content outside of any section at line {line}")]
    BadSection { line: usize },

    #[error("unknown opcode '{mnemonic}' at line {line}")]
    UnknownOpcode { line: usize, mnemonic: String },

    #[error("expected {expected} operand(s) at line {line}")]
    BadOperandCount { line: usize, expected: usize },

    #[error("{message} at line {line}")]
    BadOperandShape { line: usize, message: String },

    #[error("duplicate label '{label}' at line {line}")]
    DuplicateLabel { line: usize, label: String },

    #[error("duplicate data name '{name}' at line {line}")]
    DuplicateData { line: usize, name: String },

    #[error("empty label at line {line}")]
    EmptyLabel { line: usize },

    #[error("malformed DB declaration at line {line}")]
    MalformedDb { line: usize },

    #[error("bad number '{token}' at line {line}")]
    BadNumber { line: usize, token: String },

    #[error("unknown symbol '{symbol}' at line {line}")]
    UnknownSymbol { line: usize, symbol: String },
}

/// Result type for assembler operations.
pub type Result<T> = std::result::Result<T, AssemblerError>;
