//! Sequential RAR5 block walk.
//!
//! Blocks are read one header at a time: the first bytes give the header
//! length, the whole header is then read and parsed, and the data area is
//! skipped without being read.

use super::{Rar5Block, Rar5BlockParser, MAX_VINT_LEN};
use crate::error::{RarError, Result};
use crate::file_media::{FileMedia, ReadInterval};
use crate::parsing::marker_header::{MarkerHeaderParser, RAR5_SIGNATURE};
use tracing::trace;

/// Enough bytes to hold the CRC32 and the longest possible size vint.
const PREFIX_PROBE: u64 = 4 + MAX_VINT_LEN as u64;

/// What a completed walk saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Number of blocks handed to the callback
    pub blocks: usize,
    /// Whether the walk stopped at an end of archive header rather than at
    /// end of file
    pub reached_end: bool,
}

/// Walk every block of a RAR5 archive in order, calling `on_block` for each.
///
/// Fails with [`RarError::FirstVolumeRequired`] when the archive turns out to
/// be a later part of a volume set, and with [`RarError::EncryptedHeaders`]
/// when headers past the encryption header cannot be read. Errors returned
/// by `on_block` stop the walk and are passed through.
pub fn walk_blocks<M, F>(media: &M, mut on_block: F) -> Result<WalkSummary>
where
    M: FileMedia + ?Sized,
    F: FnMut(&Rar5Block) -> Result<()>,
{
    let probe = media.read_up_to(0, MarkerHeaderParser::PROBE_SIZE as u64)?;
    MarkerHeaderParser::ensure_rar5(MarkerHeaderParser::detect(&probe))?;

    let length = media.length();
    let mut offset = RAR5_SIGNATURE.len() as u64;
    let mut volume = 0;
    let mut summary = WalkSummary::default();

    while offset < length {
        let prefix = media.read_up_to(offset, PREFIX_PROBE)?;
        let header_len = Rar5BlockParser::header_len(&prefix, offset)?;
        if header_len > length - offset {
            return Err(RarError::InvalidHeader { offset });
        }

        let header = media.read_range(ReadInterval::at(offset, header_len))?;
        let block = Rar5BlockParser::parse(&header, offset)?;
        trace!(
            offset,
            header_type = block.info().header_type,
            header_len,
            data_size = block.info().data_size,
            "block"
        );

        match &block {
            Rar5Block::Main(main) => {
                if main.is_later_volume() {
                    return Err(RarError::FirstVolumeRequired {
                        volume: main.volume_number.unwrap_or_default(),
                    });
                }
                volume = main.volume_number.unwrap_or_default();
            }
            // Data continued from a volume we do not have
            Rar5Block::File(file) if file.info.header_flags().split_before => {
                return Err(RarError::FirstVolumeRequired {
                    volume: volume.max(1),
                });
            }
            Rar5Block::Encryption(_) => return Err(RarError::EncryptedHeaders),
            _ => {}
        }

        on_block(&block)?;
        summary.blocks += 1;

        if matches!(block, Rar5Block::End(_)) {
            summary.reached_end = true;
            break;
        }
        offset = block.info().next_offset();
    }

    Ok(summary)
}
