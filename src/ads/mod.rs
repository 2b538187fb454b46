//! NTFS alternate data streams stored in RAR5 archives.
//!
//! WinRAR stores each alternate data stream of a file as an `STM` service
//! header right after the file's own header. Most extractors skip service
//! headers, so the streams are effectively hidden. Conversion rewrites every
//! `STM` header in place as a regular file header, named after the file it
//! belongs to, and leaves all compressed data untouched.
//!
//! ```rust,ignore
//! use rar_ads::{analyze, rewrite};
//!
//! let streams = analyze("evidence.rar")?;
//! println!("{} stream(s) found.", streams.len());
//! rewrite(&streams, "evidence.rar".as_ref(), "evidence.ads.rar".as_ref())?;
//! ```

mod locator;
mod rewriter;
mod service_header;
mod transcoder;

pub use locator::{StreamLocator, ADS_STREAM_NAME};
pub use rewriter::{rewrite, rewrite_stream};
pub use service_header::ServiceHeader;
pub use transcoder::{AdsTranscoder, ADS_FILE_PREFIX, ADS_FILE_SEPARATOR};

use crate::error::Result;
use crate::file_media::{FileMedia, LocalFileMedia};
use crate::parsing::rar5::{walk_blocks, Rar5EntryHeader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A stream header paired with the file header it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdsDescriptor {
    pub stream: ServiceHeader,
    pub owner: Rar5EntryHeader,
}

impl AdsDescriptor {
    pub fn new(stream: &Rar5EntryHeader, owner: Rar5EntryHeader) -> Self {
        Self {
            stream: ServiceHeader::from(stream),
            owner,
        }
    }

    /// Offset of the stream header in the archive.
    pub fn offset(&self) -> u64 {
        self.stream.offset
    }

    /// Name the stream gets as a file entry.
    pub fn file_name(&self) -> Vec<u8> {
        let suffix = AdsTranscoder::stream_suffix(
            &self.stream.extra_area,
            self.stream.extra_size,
            self.stream.offset,
        );
        AdsTranscoder::file_name(&self.owner.name, &suffix)
    }
}

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Only locate streams, do not write anything.
    pub analyze_only: bool,
    /// Extension replacing the input's own for the output file.
    pub output_extension: String,
    /// Directory for output files; next to the input when `None`.
    pub output_dir: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            analyze_only: false,
            output_extension: "ads.rar".to_string(),
            output_dir: None,
        }
    }
}

impl ConvertOptions {
    /// Where the converted copy of `input` goes.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let sibling = input.with_extension(&self.output_extension);
        match (&self.output_dir, sibling.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => sibling,
        }
    }
}

/// Outcome of converting one archive.
#[derive(Debug)]
pub struct ConvertReport {
    pub streams: Vec<AdsDescriptor>,
    /// Written output file, if any.
    pub output: Option<PathBuf>,
}

/// Locate every alternate data stream header in the archive at `path`.
pub fn analyze(path: impl AsRef<Path>) -> Result<Vec<AdsDescriptor>> {
    let media = LocalFileMedia::open(path)?;
    analyze_media(&media)
}

/// Locate every alternate data stream header in `media`.
pub fn analyze_media<M: FileMedia + ?Sized>(media: &M) -> Result<Vec<AdsDescriptor>> {
    let mut locator = StreamLocator::new();
    let summary = walk_blocks(media, |block| locator.observe(block))?;
    let streams = locator.finish();
    debug!(
        blocks = summary.blocks,
        reached_end = summary.reached_end,
        streams = streams.len(),
        "analysis done"
    );
    Ok(streams)
}

/// Analyze `input` and, unless told not to, write the converted copy.
pub fn convert(input: impl AsRef<Path>, options: &ConvertOptions) -> Result<ConvertReport> {
    let input = input.as_ref();
    let streams = analyze(input)?;

    let output = if options.analyze_only || streams.is_empty() {
        None
    } else {
        let destination = options.output_path(input);
        rewrite(&streams, input, &destination)?.then_some(destination)
    };

    Ok(ConvertReport { streams, output })
}
