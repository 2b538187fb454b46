//! Editable copy of an alternate data stream's service header.

use crate::parsing::rar5::{
    Rar5EntryHeader, Rar5FileFlags, BLOCK_FLAG_DEPENDS_PREV, BLOCK_FLAG_EXTRA_DATA,
};

/// The fields of a stream's service header that get rewritten.
///
/// Built from the parsed header with the "depends on previous block" and
/// "extra area present" flags already cleared: the entry this becomes must
/// stand on its own and must not carry the stream's extra area forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHeader {
    /// Offset of the original header in the archive
    pub offset: u64,
    /// Length of the original header, CRC32 and size vint included
    pub header_len: u64,
    /// Size of the original extra area
    pub extra_size: u64,
    pub header_type: u64,
    pub block_flags: u64,
    pub data_size: u64,
    pub file_flags: u64,
    pub unpacked_size: u64,
    pub attributes: u64,
    pub mtime: Option<u32>,
    pub file_crc32: Option<u32>,
    pub compression: u64,
    pub host_os: u64,
    pub name: Vec<u8>,
    /// Original extra area bytes
    pub extra_area: Vec<u8>,
}

impl ServiceHeader {
    pub fn flags(&self) -> Rar5FileFlags {
        Rar5FileFlags::from(self.file_flags)
    }
}

impl From<&Rar5EntryHeader> for ServiceHeader {
    fn from(header: &Rar5EntryHeader) -> Self {
        Self {
            offset: header.info.offset,
            header_len: header.info.header_len,
            extra_size: header.info.extra_size,
            header_type: header.info.header_type,
            block_flags: header.info.block_flags
                & !(BLOCK_FLAG_DEPENDS_PREV | BLOCK_FLAG_EXTRA_DATA),
            data_size: header.info.data_size,
            file_flags: header.file_flags,
            unpacked_size: header.unpacked_size,
            attributes: header.attributes,
            mtime: header.mtime,
            file_crc32: header.file_crc32,
            compression: header.compression,
            host_os: header.host_os,
            name: header.name.clone(),
            extra_area: header.extra_area.clone(),
        }
    }
}
