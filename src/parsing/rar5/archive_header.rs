//! RAR5 main archive header parser.
//!
//! The main archive header appears once after the signature and contains
//! archive-level flags, including whether the file is one part of a
//! multi-volume set and which part it is.

use super::{BlockInfo, VintReader};
use crate::error::{RarError, Result};

/// RAR5 archive flags (specific to main header).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rar5ArchiveFlags {
    /// Archive is part of multi-volume set
    pub is_volume: bool,
    /// Volume number field is present (every volume but the first)
    pub has_volume_number: bool,
    /// Solid archive
    pub is_solid: bool,
    /// Recovery record present
    pub has_recovery_record: bool,
    /// Archive is locked
    pub is_locked: bool,
}

impl From<u64> for Rar5ArchiveFlags {
    fn from(flags: u64) -> Self {
        Self {
            is_volume: flags & 0x0001 != 0,
            has_volume_number: flags & 0x0002 != 0,
            is_solid: flags & 0x0004 != 0,
            has_recovery_record: flags & 0x0008 != 0,
            is_locked: flags & 0x0010 != 0,
        }
    }
}

/// Parsed RAR5 main archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rar5ArchiveHeader {
    pub info: BlockInfo,
    /// Archive-specific flags
    pub archive_flags: Rar5ArchiveFlags,
    /// Volume number (if multi-volume and not the first volume)
    pub volume_number: Option<u64>,
}

impl Rar5ArchiveHeader {
    /// Parse the fields following the common prefix.
    pub(crate) fn parse_fields(info: BlockInfo, reader: &mut VintReader<'_>) -> Result<Self> {
        let offset = info.offset;

        let archive_flags_raw = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let archive_flags = Rar5ArchiveFlags::from(archive_flags_raw);

        let volume_number = if archive_flags.has_volume_number {
            Some(reader.read().ok_or(RarError::InvalidHeader { offset })?)
        } else {
            None
        };

        Ok(Self {
            info,
            archive_flags,
            volume_number,
        })
    }

    /// Whether this archive is a later part of a volume set.
    pub fn is_later_volume(&self) -> bool {
        self.volume_number.is_some_and(|n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rar5::{Rar5Block, Rar5BlockParser, VintWriter};

    fn main_header(archive_flags: u64, volume: Option<u64>) -> Vec<u8> {
        let mut w = VintWriter::new();
        w.write_vint(1);
        w.write_vint(0);
        w.write_vint(archive_flags);
        if let Some(volume) = volume {
            w.write_vint(volume);
        }
        w.prepend_vint(w.len() as u64);
        w.prepend_u32_le(crc32fast::hash(w.as_bytes()));
        w.into_bytes()
    }

    fn parse(header: &[u8]) -> Rar5ArchiveHeader {
        match Rar5BlockParser::parse(header, 8).unwrap() {
            Rar5Block::Main(main) => main,
            other => panic!("expected main header, got {other:?}"),
        }
    }

    #[test]
    fn test_single_volume() {
        let main = parse(&main_header(0, None));
        assert!(!main.archive_flags.is_volume);
        assert_eq!(main.volume_number, None);
        assert!(!main.is_later_volume());
    }

    #[test]
    fn test_later_volume() {
        let main = parse(&main_header(0x0001 | 0x0002, Some(2)));
        assert!(main.archive_flags.is_volume);
        assert_eq!(main.volume_number, Some(2));
        assert!(main.is_later_volume());
    }

    #[test]
    fn test_first_volume_of_set() {
        let main = parse(&main_header(0x0001, None));
        assert!(main.archive_flags.is_volume);
        assert!(!main.is_later_volume());
    }

    #[test]
    fn test_missing_volume_number() {
        let header = main_header(0x0003, None);
        assert!(matches!(
            Rar5BlockParser::parse(&header, 8),
            Err(RarError::InvalidHeader { offset: 8 })
        ));
    }
}
