//! Compiled table file (PSNG format): 4-byte magic, 1-byte version, bincode body.

use std::fs;
use std::io;
use std::path::Path;

use super::NgramTables;

const MAGIC: &[u8; 4] = b"PSNG";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum NgramIoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected PSNG)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

impl NgramTables {
    pub fn to_bytes(&self) -> Result<Vec<u8>, NgramIoError> {
        let body = bincode::serialize(self).map_err(NgramIoError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NgramIoError> {
        if bytes.len() < HEADER_LEN {
            return Err(NgramIoError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(NgramIoError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(NgramIoError::UnsupportedVersion(bytes[4]));
        }
        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(NgramIoError::Deserialize)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), NgramIoError> {
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, NgramIoError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
