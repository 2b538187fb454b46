//! Service header to file header transcoding.
//!
//! An NTFS stream is stored as an `STM` service header following the file it
//! belongs to. Rewriting that header as a file header, while leaving its data
//! area alone, turns the stream into an ordinary archive entry that any
//! extractor will unpack. The entry is named after its owner:
//!
//! ```text
//! <owner name>-<stream name>       e.g. report.doc-Zone.Identifier
//! <owner name>-ADS<header offset>  when the stream name is not recorded
//! ```

use super::service_header::ServiceHeader;
use super::AdsDescriptor;
use crate::parsing::rar5::{
    VintWriter, BLOCK_FLAG_DATA_AREA, EXTRA_SERVICE_DATA, FILE_FLAG_HAS_MTIME, HEADER_TYPE_FILE,
};

/// Prefix of names made up for streams without a recorded name.
pub const ADS_FILE_PREFIX: &[u8] = b"ADS";

/// Separator between the owner's name and the stream suffix.
pub const ADS_FILE_SEPARATOR: u8 = b'-';

/// Size fields are padded to this many vint bytes, as RAR itself does.
const SIZE_FIELD_MIN_LEN: usize = 3;

pub struct AdsTranscoder;

impl AdsTranscoder {
    /// Build the file header replacing `descriptor`'s service header.
    ///
    /// `raw_header` is the original header exactly as stored in the archive
    /// (`header_len` bytes starting at its offset).
    pub fn transcode(descriptor: &AdsDescriptor, raw_header: &[u8]) -> Vec<u8> {
        let stream = &descriptor.stream;
        let tail = raw_header.len().saturating_sub(stream.extra_size as usize);
        let suffix = Self::stream_suffix(&raw_header[tail..], stream.extra_size, stream.offset);

        let mut header = stream.clone();
        header.header_type = HEADER_TYPE_FILE;
        header.name = Self::file_name(&descriptor.owner.name, &suffix);
        // Streams carry no times or attributes of their own
        header.mtime = descriptor.owner.mtime;
        header.attributes = descriptor.owner.attributes;

        Self::encode(&header)
    }

    /// Name suffix for a stream, from its extra area.
    ///
    /// Only an extra area made of a single service data record whose payload
    /// starts with `:` names the stream; the payload is used verbatim. Any
    /// other extra area falls back to `ADS` plus the header offset in hex.
    pub fn stream_suffix(extra: &[u8], extra_size: u64, offset: u64) -> Vec<u8> {
        let names_stream = extra.len() > 3
            && extra_size.checked_sub(1) == Some(u64::from(extra[0]))
            && u64::from(extra[1]) == EXTRA_SERVICE_DATA
            && extra[2] == b':';

        if names_stream {
            extra[3..].to_vec()
        } else {
            let mut suffix = ADS_FILE_PREFIX.to_vec();
            suffix.extend_from_slice(format!("{offset:x}").as_bytes());
            suffix
        }
    }

    pub fn file_name(owner_name: &[u8], suffix: &[u8]) -> Vec<u8> {
        let mut name = Vec::with_capacity(owner_name.len() + 1 + suffix.len());
        name.extend_from_slice(owner_name);
        name.push(ADS_FILE_SEPARATOR);
        name.extend_from_slice(suffix);
        name
    }

    /// Serialize a header in RAR5 file header layout, sealed with its size
    /// vint and CRC32.
    ///
    /// No extra area is written, so the header's flags must not claim one.
    pub fn encode(header: &ServiceHeader) -> Vec<u8> {
        let file_flags = if header.mtime.is_some() {
            header.file_flags | FILE_FLAG_HAS_MTIME
        } else {
            header.file_flags & !FILE_FLAG_HAS_MTIME
        };

        let mut w = VintWriter::new();
        w.write_vint(header.header_type);
        w.write_vint(header.block_flags);
        if header.block_flags & BLOCK_FLAG_DATA_AREA != 0 {
            w.write_vint_min(header.data_size, SIZE_FIELD_MIN_LEN);
        }
        w.write_vint(file_flags);
        w.write_vint_min(header.unpacked_size, SIZE_FIELD_MIN_LEN);
        w.write_vint(header.attributes);
        if let Some(mtime) = header.mtime {
            w.write_u32_le(mtime);
        }
        if header.flags().has_crc32 {
            w.write_u32_le(header.file_crc32.unwrap_or_default());
        }
        w.write_vint(header.compression);
        w.write_vint(header.host_os);
        w.write_prefixed_bytes(&header.name);

        w.prepend_vint(w.len() as u64);
        w.prepend_u32_le(crc32fast::hash(w.as_bytes()));
        w.into_bytes()
    }
}
