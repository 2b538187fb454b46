//! RAR5 file and service header parser.
//!
//! File headers describe each file in the archive. Service headers use the
//! exact same layout to store archive-level or per-file auxiliary data: the
//! archive comment (`CMT`), quick open data (`QO`), ACLs (`ACL`) and NTFS
//! alternate data streams (`STM`).

use super::{
    BlockInfo, VintReader, EXTRA_HTIME, EXTRA_SERVICE_DATA, FILE_FLAG_DIRECTORY,
    FILE_FLAG_HAS_CRC32, FILE_FLAG_HAS_MTIME, FILE_FLAG_UNKNOWN_SIZE,
};
use crate::error::{RarError, Result};

/// Seconds between 1601-01-01 (Windows FILETIME epoch) and 1970-01-01.
const FILETIME_UNIX_DIFF: u64 = 11_644_473_600;

/// RAR5 file flags (specific to file and service headers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rar5FileFlags {
    /// File is a directory
    pub is_directory: bool,
    /// File modification time is present
    pub has_mtime: bool,
    /// File CRC32 is present
    pub has_crc32: bool,
    /// Unpacked size is unknown
    pub unpacked_size_unknown: bool,
}

impl From<u64> for Rar5FileFlags {
    fn from(flags: u64) -> Self {
        Self {
            is_directory: flags & FILE_FLAG_DIRECTORY != 0,
            has_mtime: flags & FILE_FLAG_HAS_MTIME != 0,
            has_crc32: flags & FILE_FLAG_HAS_CRC32 != 0,
            unpacked_size_unknown: flags & FILE_FLAG_UNKNOWN_SIZE != 0,
        }
    }
}

/// Parsed RAR5 file or service header.
///
/// Flag and compression fields are kept raw so a header can be written back
/// with exactly the bits it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rar5EntryHeader {
    pub info: BlockInfo,
    /// Raw file flags
    pub file_flags: u64,
    /// Unpacked (original) file size
    pub unpacked_size: u64,
    /// File attributes
    pub attributes: u64,
    /// Modification time as Unix seconds, high precision record preferred
    pub mtime: Option<u32>,
    /// File CRC32 (if present)
    pub file_crc32: Option<u32>,
    /// Raw compression info
    pub compression: u64,
    /// Raw host OS code
    pub host_os: u64,
    /// File name as stored (UTF-8 in well-formed archives)
    pub name: Vec<u8>,
    /// Extra area bytes (empty if absent)
    pub extra_area: Vec<u8>,
}

impl Rar5EntryHeader {
    /// Parse the fields following the common prefix.
    pub(crate) fn parse_fields(
        info: BlockInfo,
        reader: &mut VintReader<'_>,
        extra_area: &[u8],
    ) -> Result<Self> {
        let offset = info.offset;

        let file_flags = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let unpacked_size = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let attributes = reader.read().ok_or(RarError::InvalidHeader { offset })?;

        // Modification time (if present)
        let mut mtime = if file_flags & FILE_FLAG_HAS_MTIME != 0 {
            Some(reader.read_u32_le().ok_or(RarError::InvalidHeader { offset })?)
        } else {
            None
        };

        // File CRC32 (if present)
        let file_crc32 = if file_flags & FILE_FLAG_HAS_CRC32 != 0 {
            Some(reader.read_u32_le().ok_or(RarError::InvalidHeader { offset })?)
        } else {
            None
        };

        let compression = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let host_os = reader.read().ok_or(RarError::InvalidHeader { offset })?;

        // Name length and name
        let name_len = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let name_len = usize::try_from(name_len).map_err(|_| RarError::InvalidHeader { offset })?;
        let name = reader
            .read_bytes(name_len)
            .ok_or(RarError::InvalidHeader { offset })?
            .to_vec();

        if let Some(precise) = find_extra_field(extra_area, EXTRA_HTIME).and_then(htime_mtime) {
            mtime = Some(precise);
        }

        Ok(Self {
            info,
            file_flags,
            unpacked_size,
            attributes,
            mtime,
            file_crc32,
            compression,
            host_os,
            name,
            extra_area: extra_area.to_vec(),
        })
    }

    pub fn flags(&self) -> Rar5FileFlags {
        Rar5FileFlags::from(self.file_flags)
    }

    /// Name for display, with invalid UTF-8 replaced.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// Payload of the service data record, if present.
    ///
    /// For an NTFS stream this is the stream name, starting with `:`.
    pub fn service_data(&self) -> Option<&[u8]> {
        find_extra_field(&self.extra_area, EXTRA_SERVICE_DATA)
    }
}

/// Find a specific extra field by type.
fn find_extra_field(extra: &[u8], field_type: u64) -> Option<&[u8]> {
    let mut pos = 0;
    while pos < extra.len() {
        // Each extra field: size (vint), type (vint), data
        // size = total size of type + data (does NOT include the size vint itself)
        let mut reader = VintReader::new(&extra[pos..]);
        let size = usize::try_from(reader.read()?).ok()?;
        let size_vint_len = reader.position();
        let ftype = reader.read()?;
        let header_consumed = reader.position();

        let record_end = pos.checked_add(size_vint_len)?.checked_add(size)?;
        if record_end > extra.len() || pos + header_consumed > record_end {
            return None;
        }

        if ftype == field_type {
            return Some(&extra[pos + header_consumed..record_end]);
        }
        pos = record_end;
    }
    None
}

/// Modification time from a high precision time record, as Unix seconds.
fn htime_mtime(record: &[u8]) -> Option<u32> {
    const UNIX_TIME: u64 = 0x01;
    const HAS_MTIME: u64 = 0x02;

    let mut reader = VintReader::new(record);
    let flags = reader.read()?;
    if flags & HAS_MTIME == 0 {
        return None;
    }
    if flags & UNIX_TIME != 0 {
        reader.read_u32_le()
    } else {
        let filetime = reader.read_u64_le()?;
        let seconds = (filetime / 10_000_000).checked_sub(FILETIME_UNIX_DIFF)?;
        u32::try_from(seconds).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rar5::{Rar5Block, Rar5BlockParser, VintWriter};

    struct Entry<'a> {
        kind: u64,
        file_flags: u64,
        mtime: u32,
        crc: u32,
        name: &'a [u8],
        extra: &'a [u8],
    }

    fn build(entry: &Entry<'_>) -> Vec<u8> {
        let mut w = VintWriter::new();
        w.write_vint(entry.kind);
        let mut flags = 0x02;
        if !entry.extra.is_empty() {
            flags |= 0x01;
        }
        w.write_vint(flags);
        if !entry.extra.is_empty() {
            w.write_vint(entry.extra.len() as u64);
        }
        w.write_vint(5); // data size
        w.write_vint(entry.file_flags);
        w.write_vint_min(5, 3);
        w.write_vint(0x20);
        if entry.file_flags & FILE_FLAG_HAS_MTIME != 0 {
            w.write_u32_le(entry.mtime);
        }
        if entry.file_flags & FILE_FLAG_HAS_CRC32 != 0 {
            w.write_u32_le(entry.crc);
        }
        w.write_vint(0);
        w.write_vint(0);
        w.write_prefixed_bytes(entry.name);
        w.write_bytes(entry.extra);
        w.prepend_vint(w.len() as u64);
        w.prepend_u32_le(crc32fast::hash(w.as_bytes()));
        w.into_bytes()
    }

    fn parse(header: &[u8]) -> Rar5Block {
        Rar5BlockParser::parse(header, 0).unwrap()
    }

    #[test]
    fn test_file_header_fields() {
        let header = build(&Entry {
            kind: 2,
            file_flags: FILE_FLAG_HAS_MTIME | FILE_FLAG_HAS_CRC32,
            mtime: 1_600_000_000,
            crc: 0xDEADBEEF,
            name: b"doc.txt",
            extra: &[],
        });
        let Rar5Block::File(file) = parse(&header) else {
            panic!("expected file header");
        };
        assert_eq!(file.name, b"doc.txt");
        assert_eq!(file.name_lossy(), "doc.txt");
        assert_eq!(file.mtime, Some(1_600_000_000));
        assert_eq!(file.file_crc32, Some(0xDEADBEEF));
        assert_eq!(file.unpacked_size, 5);
        assert_eq!(file.attributes, 0x20);
        assert_eq!(file.info.data_size, 5);
        assert!(file.flags().has_crc32);
        assert!(file.extra_area.is_empty());
    }

    #[test]
    fn test_service_header_stream_name() {
        let extra = [0x06, 0x07, b':', b'f', b'o', b'o', b'!'];
        let header = build(&Entry {
            kind: 3,
            file_flags: 0,
            mtime: 0,
            crc: 0,
            name: b"STM",
            extra: &extra,
        });
        let Rar5Block::Service(service) = parse(&header) else {
            panic!("expected service header");
        };
        assert_eq!(service.name, b"STM");
        assert_eq!(service.mtime, None);
        assert_eq!(service.info.extra_size, 7);
        assert_eq!(service.service_data(), Some(&b":foo!"[..]));
    }

    #[test]
    fn test_htime_unix_overrides_mtime() {
        // size 6, type 3, flags unix|mtime, u32 time
        let mut extra = vec![0x06, 0x03, 0x03];
        extra.extend_from_slice(&1_700_000_000u32.to_le_bytes());
        let header = build(&Entry {
            kind: 2,
            file_flags: FILE_FLAG_HAS_MTIME,
            mtime: 1_600_000_000,
            crc: 0,
            name: b"a",
            extra: &extra,
        });
        let Rar5Block::File(file) = parse(&header) else {
            panic!("expected file header");
        };
        assert_eq!(file.mtime, Some(1_700_000_000));
    }

    #[test]
    fn test_htime_windows_filetime() {
        // 2020-09-13T12:26:40Z as FILETIME
        let filetime = (1_600_000_000u64 + FILETIME_UNIX_DIFF) * 10_000_000 + 1234;
        let mut extra = vec![0x0A, 0x03, 0x02];
        extra.extend_from_slice(&filetime.to_le_bytes());
        let header = build(&Entry {
            kind: 2,
            file_flags: 0,
            mtime: 0,
            crc: 0,
            name: b"a",
            extra: &extra,
        });
        let Rar5Block::File(file) = parse(&header) else {
            panic!("expected file header");
        };
        assert_eq!(file.mtime, Some(1_600_000_000));
    }

    #[test]
    fn test_find_extra_field_skips_records() {
        let extra = [0x02, 0x05, 0xAA, 0x03, 0x07, b':', b'x'];
        assert_eq!(find_extra_field(&extra, 0x05), Some(&[0xAA][..]));
        assert_eq!(find_extra_field(&extra, 0x07), Some(&b":x"[..]));
        assert_eq!(find_extra_field(&extra, 0x01), None);
        // Record claims more bytes than there are
        assert_eq!(find_extra_field(&[0x09, 0x07, b':'], 0x07), None);
    }

    #[test]
    fn test_truncated_name() {
        let mut w = VintWriter::new();
        for v in [2, 0, 0, 1, 0, 0, 0, 10] {
            w.write_vint(v);
        }
        w.write_bytes(b"abc");
        w.prepend_vint(w.len() as u64);
        w.prepend_u32_le(crc32fast::hash(w.as_bytes()));
        assert!(matches!(
            Rar5BlockParser::parse(w.as_bytes(), 0),
            Err(RarError::InvalidHeader { offset: 0 })
        ));
    }
}
