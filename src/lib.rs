//! Convert NTFS alternate data streams in RAR5 archives into regular entries.
//!
//! WinRAR can archive the alternate data streams (ADS) of NTFS files. Each
//! stream is stored as an `STM` service header after its file, which most
//! extractors silently skip. This crate rewrites those headers in place as
//! ordinary file headers, so the streams come out as files next to their
//! owners (`report.doc-Zone.Identifier`, ...). Compressed data is
//! never decoded, moved between entries or re-encoded.
//!
//! ## Layout
//! - [`parsing`] - RAR signature detection and a sequential RAR5 block walker
//! - [`ads`] - stream location, header transcoding and archive rewriting
//!
//! ## Example
//!
//! ```rust,no_run
//! use rar_ads::{convert, ConvertOptions};
//!
//! let report = convert("backup.rar", &ConvertOptions::default())?;
//! println!("{} stream(s) found.", report.streams.len());
//! if let Some(output) = report.output {
//!     println!("Modified rar file saved to {}", output.display());
//! }
//! # Ok::<(), rar_ads::RarError>(())
//! ```

pub mod ads;
pub mod error;
mod file_media;
pub mod parsing;

pub use ads::{
    analyze, analyze_media, convert, rewrite, AdsDescriptor, ConvertOptions, ConvertReport,
};
pub use error::{RarError, Result};
pub use file_media::{FileMedia, LocalFileMedia, ReadInterval};
