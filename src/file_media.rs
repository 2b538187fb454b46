//! FileMedia trait - abstract byte source for RAR header reading.

use crate::error::{RarError, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Interval for reading a byte range (both ends inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadInterval {
    pub start: u64,
    pub end: u64,
}

impl ReadInterval {
    /// Interval covering `len` bytes starting at `start`. `len` must be non-zero.
    pub fn at(start: u64, len: u64) -> Self {
        Self {
            start,
            end: start + len - 1,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Byte source the block walker reads headers from.
///
/// [`LocalFileMedia`] covers files on disk; in-memory archives are served
/// straight from `[u8]`.
pub trait FileMedia {
    fn length(&self) -> u64;

    /// Read exactly the bytes in `interval`.
    fn read_range(&self, interval: ReadInterval) -> Result<Vec<u8>>;

    /// Read up to `len` bytes at `start`, stopping early at end of media.
    fn read_up_to(&self, start: u64, len: u64) -> Result<Vec<u8>> {
        let available = self.length().saturating_sub(start).min(len);
        if available == 0 {
            return Ok(Vec::new());
        }
        self.read_range(ReadInterval::at(start, available))
    }
}

/// Local file implementation.
#[derive(Debug)]
pub struct LocalFileMedia {
    file: File,
    length: u64,
}

impl LocalFileMedia {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        Ok(Self { file, length })
    }
}

impl FileMedia for LocalFileMedia {
    fn length(&self) -> u64 {
        self.length
    }

    fn read_range(&self, interval: ReadInterval) -> Result<Vec<u8>> {
        if interval.end >= self.length {
            return Err(RarError::InvalidOffset {
                offset: interval.end,
                length: self.length,
            });
        }
        let mut file = &self.file;
        file.seek(SeekFrom::Start(interval.start))?;
        let mut buffer = vec![0u8; interval.len() as usize];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl FileMedia for [u8] {
    fn length(&self) -> u64 {
        self.len() as u64
    }

    fn read_range(&self, interval: ReadInterval) -> Result<Vec<u8>> {
        if interval.end >= self.length() {
            return Err(RarError::InvalidOffset {
                offset: interval.end,
                length: self.length(),
            });
        }
        Ok(self[interval.start as usize..=interval.end as usize].to_vec())
    }
}
