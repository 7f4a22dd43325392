//! Error types for the BVM container codec.

use thiserror::Error;

/// Container codec failure. Checks run in the order the variants are
/// listed for `load`: open, magic, header, payload.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("cannot open file: {0}")]
    Open(#[source] std::io::Error),

    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("bad magic")]
    BadMagic,

    #[error("truncated header")]
    TruncatedHeader,

    #[error("truncated payload")]
    TruncatedPayload,
}
