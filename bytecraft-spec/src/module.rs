//! The assembler/VM exchange unit and the BVM on-disk codec.
//!
//! File layout, bit-exact:
//!
//! ```text
//! "BVM\0" | entry_point u32 LE | code_size u32 LE | data_size u32 LE
//!         | code_size code bytes | data_size data bytes
//! ```
//!
//! Trailing bytes beyond the declared payload are ignored on load.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::ModuleError;
use crate::MAGIC;

/// A translated program: entry point plus code and data byte runs.
///
/// `entry_point` is an offset within `code`. `data` is zero-initialized
/// at construction time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub entry_point: u32,
    pub code: Vec<u8>,
    pub data: Vec<u8>,
}

impl Module {
    /// Build a module with a zero-filled data region of `data_size` bytes.
    pub fn new(entry_point: u32, code: Vec<u8>, data_size: u32) -> Self {
        Module {
            entry_point,
            code,
            data: vec![0; data_size as usize],
        }
    }

    /// Total size of the flat memory image the VM builds from this module.
    pub fn image_len(&self) -> usize {
        self.code.len() + self.data.len()
    }

    /// Serialize in BVM layout.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), ModuleError> {
        writer.write_all(&MAGIC).map_err(ModuleError::Write)?;
        writer
            .write_all(&self.entry_point.to_le_bytes())
            .map_err(ModuleError::Write)?;
        writer
            .write_all(&(self.code.len() as u32).to_le_bytes())
            .map_err(ModuleError::Write)?;
        writer
            .write_all(&(self.data.len() as u32).to_le_bytes())
            .map_err(ModuleError::Write)?;
        writer.write_all(&self.code).map_err(ModuleError::Write)?;
        writer.write_all(&self.data).map_err(ModuleError::Write)?;
        Ok(())
    }

    /// Deserialize from BVM layout.
    ///
    /// Validates in order: magic, full header, exact payload.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, ModuleError> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|_| ModuleError::BadMagic)?;
        if magic != MAGIC {
            return Err(ModuleError::BadMagic);
        }

        let mut header = [0u8; 12];
        reader
            .read_exact(&mut header)
            .map_err(|_| ModuleError::TruncatedHeader)?;
        let entry_point = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let code_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let data_size = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let mut code = vec![0u8; code_size as usize];
        reader
            .read_exact(&mut code)
            .map_err(|_| ModuleError::TruncatedPayload)?;

        let mut data = vec![0u8; data_size as usize];
        reader
            .read_exact(&mut data)
            .map_err(|_| ModuleError::TruncatedPayload)?;

        Ok(Module {
            entry_point,
            code,
            data,
        })
    }

    /// Write a `.bvm` file at `path`.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ModuleError> {
        let file = File::create(path).map_err(ModuleError::Open)?;
        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;
        writer.flush().map_err(ModuleError::Write)?;
        Ok(())
    }

    /// Read a `.bvm` file from `path`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let file = File::open(path).map_err(ModuleError::Open)?;
        let mut reader = BufReader::new(file);
        Self::load(&mut reader)
    }
}
