//! Marker header parser - RAR signature and format version detection.
//!
//! RAR4: 0x52 0x61 0x72 0x21 0x1A 0x07 0x00
//! RAR5: 0x52 0x61 0x72 0x21 0x1A 0x07 0x01 0x00

use crate::error::{RarError, Result};

/// RAR4 magic signature.
pub const RAR4_SIGNATURE: [u8; 7] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00];

/// RAR5 magic signature.
pub const RAR5_SIGNATURE: [u8; 8] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00];

/// Container format generation, as told by the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarVersion {
    /// RAR 1.5 - 4.x
    Rar4,
    /// RAR 5.0+
    Rar5,
}

impl RarVersion {
    pub fn number(self) -> u8 {
        match self {
            Self::Rar4 => 4,
            Self::Rar5 => 5,
        }
    }
}

pub struct MarkerHeaderParser;

impl MarkerHeaderParser {
    /// Longest signature we need to look at.
    pub const PROBE_SIZE: usize = RAR5_SIGNATURE.len();

    /// Detect the format version from the first bytes of a file.
    /// `None` means the bytes are not a RAR signature at all.
    pub fn detect(buffer: &[u8]) -> Option<RarVersion> {
        if buffer.starts_with(&RAR5_SIGNATURE) {
            Some(RarVersion::Rar5)
        } else if buffer.starts_with(&RAR4_SIGNATURE) {
            Some(RarVersion::Rar4)
        } else {
            None
        }
    }

    /// Reject anything that is not a RAR5 signature.
    pub fn ensure_rar5(version: Option<RarVersion>) -> Result<()> {
        match version {
            None => Err(RarError::UnrecognizedContainer),
            Some(RarVersion::Rar5) => Ok(()),
            Some(other) => Err(RarError::UnsupportedVersion(other.number())),
        }
    }
}
