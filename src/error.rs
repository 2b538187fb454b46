//! Error types for RAR5 analysis and header rewriting.
//!
//! This module provides the [`RarError`] type which covers everything that can
//! go wrong while walking an archive, locating alternate data streams, or
//! splicing rewritten headers into a copy of the archive.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Input gate | [`UnrecognizedContainer`], [`UnsupportedVersion`], [`FirstVolumeRequired`] | Input is not something this tool can convert |
//! | Structure | [`OrphanStreamBlock`], [`InvalidHeader`], [`HeaderCrcMismatch`], [`EncryptedHeaders`] | Archive headers are malformed or unreadable |
//! | I/O | [`Io`], [`BufferTooSmall`], [`InvalidOffset`] | Read/write errors |
//!
//! The input gate errors are raised during analysis, before any output file is
//! created. Each one maps to a distinct process exit status via
//! [`RarError::exit_code`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use rar_ads::{analyze, RarError};
//!
//! match analyze("movie.rar") {
//!     Ok(streams) => println!("{} stream(s) found.", streams.len()),
//!     Err(RarError::UnsupportedVersion(v)) => eprintln!("RAR{} is not supported", v),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! [`UnrecognizedContainer`]: RarError::UnrecognizedContainer
//! [`UnsupportedVersion`]: RarError::UnsupportedVersion
//! [`FirstVolumeRequired`]: RarError::FirstVolumeRequired
//! [`OrphanStreamBlock`]: RarError::OrphanStreamBlock
//! [`InvalidHeader`]: RarError::InvalidHeader
//! [`HeaderCrcMismatch`]: RarError::HeaderCrcMismatch
//! [`EncryptedHeaders`]: RarError::EncryptedHeaders
//! [`Io`]: RarError::Io
//! [`BufferTooSmall`]: RarError::BufferTooSmall
//! [`InvalidOffset`]: RarError::InvalidOffset

use std::io;
use thiserror::Error;

/// Error type for RAR operations.
#[derive(Debug, Error)]
pub enum RarError {
    /// The file does not start with a RAR signature.
    ///
    /// RAR files must start with either:
    /// - RAR4: `Rar!\x1a\x07\x00` (7 bytes)
    /// - RAR5: `Rar!\x1a\x07\x01\x00` (8 bytes)
    #[error("Not a rar file")]
    UnrecognizedContainer,

    /// The archive is a RAR container, but not RAR5.
    ///
    /// The `u8` is the detected format version (4 for RAR 1.5-4.x).
    #[error("Only rar version 5 is supported (found version {0})")]
    UnsupportedVersion(u8),

    /// The archive is a later part of a multi-volume set.
    ///
    /// Headers in later volumes continue data from earlier ones, so they
    /// cannot be rewritten on their own.
    #[error("Not the first volume (volume number {volume})")]
    FirstVolumeRequired {
        /// Zero-based volume number, as far as the headers tell.
        volume: u64,
    },

    /// An alternate data stream header has no owning file header before it.
    #[error("Stream block at offset {offset:#x} has no preceding file block")]
    OrphanStreamBlock {
        /// Offset of the service header in the archive.
        offset: u64,
    },

    /// The archive has encrypted headers.
    ///
    /// RAR5 archives created with `rar -hp` encrypt every header after the
    /// encryption header, so nothing past it can be located or rewritten.
    #[error("Archive has encrypted headers")]
    EncryptedHeaders,

    /// A header in the archive is malformed or truncated.
    #[error("Invalid or malformed header at offset {offset:#x}")]
    InvalidHeader {
        /// Offset of the header in the archive.
        offset: u64,
    },

    /// The CRC32 stored in a header does not match its contents.
    #[error("Header CRC mismatch at offset {offset:#x}: stored {stored:08x}, computed {computed:08x}")]
    HeaderCrcMismatch {
        /// Offset of the header in the archive.
        offset: u64,
        /// CRC32 stored in the header.
        stored: u32,
        /// CRC32 of the header bytes as read.
        computed: u32,
    },

    /// The provided buffer is too small.
    #[error("Buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        have: usize,
    },

    /// An offset behind the current read position, or past the end of the
    /// archive, was requested.
    #[error("Invalid offset: {offset} (position: {length})")]
    InvalidOffset {
        /// The requested offset.
        offset: u64,
        /// The position or length it was checked against.
        length: u64,
    },

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RarError {
    /// Process exit status for this error.
    ///
    /// Scripted callers rely on these staying stable.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnrecognizedContainer => 2,
            Self::UnsupportedVersion(_) => 3,
            Self::FirstVolumeRequired { .. } => 4,
            Self::OrphanStreamBlock { .. } => 5,
            Self::EncryptedHeaders => 6,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, RarError>;
