//! Copying an archive with stream headers replaced.
//!
//! The copy is a single forward pass: bytes between stream headers are copied
//! verbatim, each stream header is read and replaced by its transcoded
//! version, and the data areas after them are left as they were.

use super::transcoder::AdsTranscoder;
use super::AdsDescriptor;
use crate::error::{RarError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Write a copy of `source` to `destination` with every stream header in
/// `streams` rewritten as a file header.
///
/// Returns `false` without touching the file system when there is nothing
/// to rewrite. The destination is created (or truncated) once the source is
/// open; if the copy fails after that, it is removed again.
pub fn rewrite(streams: &[AdsDescriptor], source: &Path, destination: &Path) -> Result<bool> {
    if streams.is_empty() {
        debug!(source = %source.display(), "no stream headers, nothing to do");
        return Ok(false);
    }

    if same_file(source, destination) {
        return Err(RarError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to overwrite source archive {}", source.display()),
        )));
    }

    // Nothing at the destination is touched until the source is open
    let mut input = BufReader::new(File::open(source)?);
    let output = File::create(destination)?;

    let result = copy_rewritten(streams, &mut input, output);
    if result.is_err() {
        // Best effort, the original error is what matters
        let _ = fs::remove_file(destination);
    }
    result.map(|()| true)
}

fn copy_rewritten<R: Read>(streams: &[AdsDescriptor], input: &mut R, output: File) -> Result<()> {
    let mut output = BufWriter::new(output);
    rewrite_stream(streams, input, &mut output)?;
    output.flush()?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Copy `input` to `output`, replacing each stream header on the way.
///
/// `streams` must be in ascending offset order; the input is never read
/// backwards. Returns the number of bytes written.
pub fn rewrite_stream<R, W>(streams: &[AdsDescriptor], input: &mut R, output: &mut W) -> Result<u64>
where
    R: Read,
    W: Write,
{
    let mut position = 0u64;
    let mut written = 0u64;

    for stream in streams {
        let offset = stream.offset();
        if offset < position {
            return Err(RarError::InvalidOffset {
                offset,
                length: position,
            });
        }

        written += copy_exact(input, output, offset - position)?;

        let header_len = stream.stream.header_len;
        let mut raw = vec![0u8; header_len as usize];
        input.read_exact(&mut raw)?;
        position = offset + header_len;

        let header = AdsTranscoder::transcode(stream, &raw);
        if header.len() as u64 > header_len {
            warn!(
                offset,
                old_len = header_len,
                new_len = header.len(),
                "rewritten header is larger than the original"
            );
        }
        debug!(offset, old_len = header_len, new_len = header.len(), "rewrote stream header");
        output.write_all(&header)?;
        written += header.len() as u64;
    }

    written += io::copy(input, output)?;
    Ok(written)
}

/// Copy exactly `len` bytes, failing if the input ends first.
fn copy_exact<R: Read, W: Write>(input: &mut R, output: &mut W, len: u64) -> Result<u64> {
    let copied = io::copy(&mut input.by_ref().take(len), output)?;
    if copied != len {
        return Err(RarError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("archive ended after {copied} of {len} bytes"),
        )));
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rar5::{BlockInfo, Rar5EntryHeader, HEADER_TYPE_FILE, HEADER_TYPE_SERVICE};

    fn entry(header_type: u64, offset: u64, header_len: u64, name: &[u8]) -> Rar5EntryHeader {
        Rar5EntryHeader {
            info: BlockInfo {
                offset,
                crc32: 0,
                header_type,
                header_len,
                block_flags: 0,
                extra_size: 0,
                data_size: 0,
            },
            file_flags: 0,
            unpacked_size: 0,
            attributes: 0,
            mtime: None,
            file_crc32: None,
            compression: 0,
            host_os: 0,
            name: name.to_vec(),
            extra_area: Vec::new(),
        }
    }

    fn stream_at(offset: u64, header_len: u64) -> AdsDescriptor {
        let owner = entry(HEADER_TYPE_FILE, 0, 10, b"f");
        AdsDescriptor::new(&entry(HEADER_TYPE_SERVICE, offset, header_len, b"STM"), owner)
    }

    #[test]
    fn test_bytes_outside_headers_are_copied() {
        let source: Vec<u8> = (0..100u8).collect();
        let streams = [stream_at(10, 20), stream_at(50, 20)];
        let mut output = Vec::new();
        let written = rewrite_stream(&streams, &mut source.as_slice(), &mut output).unwrap();
        assert_eq!(written, output.len() as u64);

        let first = AdsTranscoder::transcode(&streams[0], &source[10..30]);
        let second = AdsTranscoder::transcode(&streams[1], &source[50..70]);

        let mut expected = source[..10].to_vec();
        expected.extend_from_slice(&first);
        expected.extend_from_slice(&source[30..50]);
        expected.extend_from_slice(&second);
        expected.extend_from_slice(&source[70..]);
        assert_eq!(output, expected);
    }

    #[test]
    fn test_out_of_order_streams_rejected() {
        let source = vec![0u8; 100];
        let streams = [stream_at(50, 20), stream_at(10, 20)];
        let mut output = Vec::new();
        assert!(matches!(
            rewrite_stream(&streams, &mut source.as_slice(), &mut output),
            Err(RarError::InvalidOffset { offset: 10, length: 70 })
        ));
    }

    #[test]
    fn test_truncated_source() {
        let source = vec![0u8; 40];
        let mut output = Vec::new();
        let result = rewrite_stream(&[stream_at(30, 20)], &mut source.as_slice(), &mut output);
        assert!(matches!(result, Err(RarError::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof));

        let result = rewrite_stream(&[stream_at(60, 20)], &mut source.as_slice(), &mut output);
        assert!(matches!(result, Err(RarError::Io(_))));
    }

    #[test]
    fn test_nothing_to_do_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.rar");
        let rewritten = rewrite(&[], &dir.path().join("missing.rar"), &destination).unwrap();
        assert!(!rewritten);
        assert!(!destination.exists());
    }

    #[test]
    fn test_failed_rewrite_removes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.rar");
        let destination = dir.path().join("out.rar");
        fs::write(&source, [0u8; 16]).unwrap();

        assert!(rewrite(&[stream_at(8, 20)], &source, &destination).is_err());
        assert!(!destination.exists());
    }

    #[test]
    fn test_missing_source_keeps_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("kept.rar");
        fs::write(&destination, b"user data").unwrap();

        let result = rewrite(&[stream_at(8, 20)], &dir.path().join("missing.rar"), &destination);
        assert!(matches!(result, Err(RarError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound));
        assert_eq!(fs::read(&destination).unwrap(), b"user data");
    }

    #[test]
    fn test_refuses_to_overwrite_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.rar");
        fs::write(&source, [0u8; 64]).unwrap();

        assert!(rewrite(&[stream_at(8, 20)], &source, &source).is_err());
        assert_eq!(fs::read(&source).unwrap(), vec![0u8; 64]);
    }
}
