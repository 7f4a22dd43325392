//! ByteCraft disassembler.
//!
//! Decodes code bytes exactly the way the VM's fetch sequence consumes
//! them, and renders a textual listing. This is tooling; the VM
//! decodes in-band so that faults stay architectural.
//!
//! ## Example
//!
//! ```rust
//! use bytecraft_disassembler::decode_at;
//!
//! // nop
//! let (instr, consumed) = decode_at(&[0x00], 0).unwrap();
//! assert_eq!(consumed, 1);
//! assert_eq!(instr.encoded_len(), 1);
//! ```

pub mod decoder;
pub mod disassembler;
pub mod error;

pub use decoder::decode_at;
pub use disassembler::{disassemble, format_instruction};
pub use error::DecodeError;
