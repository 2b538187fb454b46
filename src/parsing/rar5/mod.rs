//! RAR5 format parsing modules.
//!
//! RAR5 uses a completely different header format than RAR4:
//! - Variable-length integers (vint) for sizes
//! - CRC-32 instead of CRC-16
//! - Different header type codes
//!
//! Every header starts with the same prefix:
//!
//! ```text
//! CRC32 (u32 LE) | header size (vint) | type (vint) | flags (vint)
//!   [extra area size (vint)] [data size (vint)] | type-specific fields | [extra area]
//! ```
//!
//! The CRC covers everything after itself, and the header size counts the
//! bytes after the size vint. The data area (if any) follows the header.

mod vint;

pub mod archive_header;
pub mod block;
pub mod entry_header;
pub mod walker;

pub use archive_header::{Rar5ArchiveFlags, Rar5ArchiveHeader};
pub use block::{BlockInfo, Rar5Block, Rar5BlockParser};
pub use entry_header::{Rar5EntryHeader, Rar5FileFlags};
pub use vint::{encode_vint, read_vint, VintReader, VintWriter, MAX_VINT_LEN};
pub use walker::{walk_blocks, WalkSummary};

/// Header type code of a file header.
pub const HEADER_TYPE_FILE: u64 = 2;
/// Header type code of a service header.
pub const HEADER_TYPE_SERVICE: u64 = 3;

/// Extra area is present at the end of the header.
pub const BLOCK_FLAG_EXTRA_DATA: u64 = 0x0001;
/// Data area follows the header.
pub const BLOCK_FLAG_DATA_AREA: u64 = 0x0002;
/// Skip header if its type is unknown.
pub const BLOCK_FLAG_SKIP_IF_UNKNOWN: u64 = 0x0004;
/// Data continues from the previous volume.
pub const BLOCK_FLAG_SPLIT_BEFORE: u64 = 0x0008;
/// Data continues in the next volume.
pub const BLOCK_FLAG_SPLIT_AFTER: u64 = 0x0010;
/// Block depends on the preceding file block.
pub const BLOCK_FLAG_DEPENDS_PREV: u64 = 0x0020;

/// Entry is a directory.
pub const FILE_FLAG_DIRECTORY: u64 = 0x0001;
/// 32-bit Unix modification time is present.
pub const FILE_FLAG_HAS_MTIME: u64 = 0x0002;
/// CRC32 of the unpacked data is present.
pub const FILE_FLAG_HAS_CRC32: u64 = 0x0004;
/// Unpacked size is unknown.
pub const FILE_FLAG_UNKNOWN_SIZE: u64 = 0x0008;

/// Extra record carrying high precision file times.
pub const EXTRA_HTIME: u64 = 0x03;
/// Extra record carrying service data, e.g. the name of an NTFS stream.
pub const EXTRA_SERVICE_DATA: u64 = 0x07;

/// RAR5 header type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rar5HeaderType {
    /// Main archive header
    Main = 1,
    /// File header
    File = 2,
    /// Service header (e.g., NTFS streams, ACL)
    Service = 3,
    /// Encryption header
    Encryption = 4,
    /// End of archive header
    End = 5,
}

impl TryFrom<u64> for Rar5HeaderType {
    type Error = ();

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Main),
            HEADER_TYPE_FILE => Ok(Self::File),
            HEADER_TYPE_SERVICE => Ok(Self::Service),
            4 => Ok(Self::Encryption),
            5 => Ok(Self::End),
            _ => Err(()),
        }
    }
}

/// RAR5 common header flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rar5HeaderFlags {
    /// Extra area is present after header
    pub has_extra_area: bool,
    /// Data area is present after header
    pub has_data_area: bool,
    /// Skip header if unknown type
    pub skip_if_unknown: bool,
    /// Data continues from previous volume
    pub split_before: bool,
    /// Data continues in next volume
    pub split_after: bool,
    /// Block depends on the preceding file block
    pub depends_on_previous: bool,
}

impl From<u64> for Rar5HeaderFlags {
    fn from(flags: u64) -> Self {
        Self {
            has_extra_area: flags & BLOCK_FLAG_EXTRA_DATA != 0,
            has_data_area: flags & BLOCK_FLAG_DATA_AREA != 0,
            skip_if_unknown: flags & BLOCK_FLAG_SKIP_IF_UNKNOWN != 0,
            split_before: flags & BLOCK_FLAG_SPLIT_BEFORE != 0,
            split_after: flags & BLOCK_FLAG_SPLIT_AFTER != 0,
            depends_on_previous: flags & BLOCK_FLAG_DEPENDS_PREV != 0,
        }
    }
}
