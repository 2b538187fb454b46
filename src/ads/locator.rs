//! Locating alternate data stream headers during a block walk.

use super::AdsDescriptor;
use crate::error::{RarError, Result};
use crate::parsing::rar5::{Rar5Block, Rar5EntryHeader};
use tracing::debug;

/// Name of the service headers holding NTFS alternate data streams.
pub const ADS_STREAM_NAME: &[u8] = b"STM";

/// Collects stream headers from a block walk, pairing each with the file
/// header most recently seen before it.
///
/// Feed it every block in archive order via [`observe`](Self::observe), then
/// take the result with [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct StreamLocator {
    last_file: Option<Rar5EntryHeader>,
    streams: Vec<AdsDescriptor>,
}

impl StreamLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, block: &Rar5Block) -> Result<()> {
        match block {
            Rar5Block::File(file) => self.last_file = Some(file.clone()),
            Rar5Block::Service(service) if service.name == ADS_STREAM_NAME => {
                let owner = self
                    .last_file
                    .clone()
                    .ok_or(RarError::OrphanStreamBlock {
                        offset: service.info.offset,
                    })?;
                let stream_name = service
                    .service_data()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default();
                debug!(
                    offset = service.info.offset,
                    owner = %owner.name_lossy(),
                    stream = %stream_name,
                    "found stream header"
                );
                self.streams.push(AdsDescriptor::new(service, owner));
            }
            _ => {}
        }
        Ok(())
    }

    /// Located streams, in archive order.
    pub fn finish(self) -> Vec<AdsDescriptor> {
        self.streams
    }
}
