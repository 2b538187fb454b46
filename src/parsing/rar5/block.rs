//! RAR5 block prefix parsing and block dispatch.
//!
//! Every RAR5 header shares the same prefix (CRC32, size, type, flags and the
//! optional extra/data sizes). [`Rar5BlockParser`] reads that prefix, checks
//! the header CRC, and hands the rest to the type-specific parsers.

use super::{
    Rar5ArchiveHeader, Rar5EntryHeader, Rar5HeaderFlags, Rar5HeaderType, VintReader,
    BLOCK_FLAG_DATA_AREA, BLOCK_FLAG_EXTRA_DATA,
};
use crate::error::{RarError, Result};

/// Fields shared by every RAR5 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Offset of the header's first byte (the CRC32) in the archive
    pub offset: u64,
    /// Header CRC32
    pub crc32: u32,
    /// Raw header type code
    pub header_type: u64,
    /// Total header length, CRC32 and size vint included
    pub header_len: u64,
    /// Raw common header flags
    pub block_flags: u64,
    /// Size of the extra area at the end of the header
    pub extra_size: u64,
    /// Size of the data area following the header
    pub data_size: u64,
}

impl BlockInfo {
    pub fn header_flags(&self) -> Rar5HeaderFlags {
        Rar5HeaderFlags::from(self.block_flags)
    }

    /// Offset of the block after this one.
    pub fn next_offset(&self) -> u64 {
        self.offset
            .saturating_add(self.header_len)
            .saturating_add(self.data_size)
    }
}

/// One parsed RAR5 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rar5Block {
    Main(Rar5ArchiveHeader),
    File(Rar5EntryHeader),
    Service(Rar5EntryHeader),
    Encryption(BlockInfo),
    End(BlockInfo),
    /// Unknown header type, walked over using its sizes.
    Other(BlockInfo),
}

impl Rar5Block {
    pub fn info(&self) -> &BlockInfo {
        match self {
            Self::Main(h) => &h.info,
            Self::File(h) | Self::Service(h) => &h.info,
            Self::Encryption(info) | Self::End(info) | Self::Other(info) => info,
        }
    }
}

pub struct Rar5BlockParser;

impl Rar5BlockParser {
    /// CRC32 + size + type + flags, one byte each for the vints.
    pub const MIN_HEADER_SIZE: usize = 7;

    /// Total header length (CRC32 and size vint included), read from the
    /// first bytes of a header.
    pub fn header_len(prefix: &[u8], offset: u64) -> Result<u64> {
        if prefix.len() < Self::MIN_HEADER_SIZE {
            return Err(RarError::BufferTooSmall {
                needed: Self::MIN_HEADER_SIZE,
                have: prefix.len(),
            });
        }

        let mut reader = VintReader::new(prefix);
        reader.read_u32_le().ok_or(RarError::InvalidHeader { offset })?;
        let header_size = reader.read().ok_or(RarError::InvalidHeader { offset })?;

        // An empty header body cannot even hold the type and flags
        if header_size < 2 {
            return Err(RarError::InvalidHeader { offset });
        }

        (reader.position() as u64)
            .checked_add(header_size)
            .ok_or(RarError::InvalidHeader { offset })
    }

    /// Parse a complete header located at `offset` in the archive.
    ///
    /// `buffer` must start at the header's CRC32 and hold at least the whole
    /// header; trailing bytes are ignored.
    pub fn parse(buffer: &[u8], offset: u64) -> Result<Rar5Block> {
        let header_len = Self::header_len(buffer, offset)?;
        let total = usize::try_from(header_len).map_err(|_| RarError::InvalidHeader { offset })?;
        if total > buffer.len() {
            return Err(RarError::BufferTooSmall {
                needed: total,
                have: buffer.len(),
            });
        }
        let header = &buffer[..total];

        let mut reader = VintReader::new(header);
        let crc32 = reader.read_u32_le().ok_or(RarError::InvalidHeader { offset })?;
        let computed = crc32fast::hash(&header[4..]);
        if computed != crc32 {
            return Err(RarError::HeaderCrcMismatch {
                offset,
                stored: crc32,
                computed,
            });
        }

        // Header size, already accounted for in `total`
        reader.read().ok_or(RarError::InvalidHeader { offset })?;

        let header_type = reader.read().ok_or(RarError::InvalidHeader { offset })?;
        let block_flags = reader.read().ok_or(RarError::InvalidHeader { offset })?;

        let extra_size = if block_flags & BLOCK_FLAG_EXTRA_DATA != 0 {
            reader.read().ok_or(RarError::InvalidHeader { offset })?
        } else {
            0
        };

        let data_size = if block_flags & BLOCK_FLAG_DATA_AREA != 0 {
            reader.read().ok_or(RarError::InvalidHeader { offset })?
        } else {
            0
        };

        // The extra area sits at the very end of the header
        let fields_end = (total as u64)
            .checked_sub(extra_size)
            .filter(|&end| end >= reader.position() as u64)
            .ok_or(RarError::InvalidHeader { offset })? as usize;
        let extra_area = &header[fields_end..];

        let info = BlockInfo {
            offset,
            crc32,
            header_type,
            header_len,
            block_flags,
            extra_size,
            data_size,
        };

        let block = match Rar5HeaderType::try_from(header_type) {
            Ok(Rar5HeaderType::Main) => {
                Rar5Block::Main(Rar5ArchiveHeader::parse_fields(info, &mut reader)?)
            }
            Ok(Rar5HeaderType::File) => {
                Rar5Block::File(Rar5EntryHeader::parse_fields(info, &mut reader, extra_area)?)
            }
            Ok(Rar5HeaderType::Service) => {
                Rar5Block::Service(Rar5EntryHeader::parse_fields(info, &mut reader, extra_area)?)
            }
            Ok(Rar5HeaderType::Encryption) => Rar5Block::Encryption(info),
            Ok(Rar5HeaderType::End) => Rar5Block::End(info),
            Err(()) => Rar5Block::Other(info),
        };

        Ok(block)
    }
}
