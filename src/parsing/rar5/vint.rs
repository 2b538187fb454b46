//! Variable-length integer (vint) reading and writing for RAR5.
//!
//! RAR5 uses variable-length integers where each byte contributes 7 bits
//! of data, and the high bit indicates if more bytes follow.
//!
//! Format:
//! - Bits 0-6: Data bits
//! - Bit 7: Continuation flag (1 = more bytes follow)
//!
//! A value may be padded with extra `0x80` groups before the terminal byte.
//! RAR writers do this for size fields so they can be patched in place later,
//! and readers decode the padded form to the same value.

/// Longest vint a `u64` can need.
pub const MAX_VINT_LEN: usize = 10;

/// Read a variable-length integer from a byte slice.
/// Returns the value and the number of bytes consumed.
#[inline]
pub fn read_vint(data: &[u8]) -> Option<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in data.iter().enumerate() {
        // Prevent overflow - vint can be at most 10 bytes for u64
        if i >= MAX_VINT_LEN {
            return None;
        }

        result |= u64::from(byte & 0x7F) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    // Ran out of bytes without finding end
    None
}

/// Encode `value` as a vint of at least `min_len` bytes.
pub fn encode_vint(mut value: u64, min_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VINT_LEN.max(min_len));
    while value != 0 {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    while out.len() < min_len.max(1) {
        out.push(0x80);
    }
    if let Some(last) = out.last_mut() {
        *last &= 0x7F;
    }
    out
}

/// Helper for reading multiple vints from a buffer.
pub struct VintReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> VintReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Read the next vint from the buffer.
    #[inline]
    pub fn read(&mut self) -> Option<u64> {
        let (value, consumed) = read_vint(&self.data[self.offset..])?;
        self.offset += consumed;
        Some(value)
    }

    /// Read a fixed number of bytes.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(count)?;
        if end > self.data.len() {
            return None;
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Some(slice)
    }

    /// Read a u32 in little-endian format.
    #[inline]
    pub fn read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.read_bytes(4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a u64 in little-endian format.
    #[inline]
    pub fn read_u64_le(&mut self) -> Option<u64> {
        let bytes = self.read_bytes(8)?;
        Some(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
            bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Current position in the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }
}

/// Byte buffer builder for RAR5 headers.
///
/// Everything is appended at the end, except the `prepend_*` calls which
/// insert at the front. Headers are built body first and then sealed by
/// prepending the size vint and the CRC32, since both depend on what follows
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VintWriter {
    data: Vec<u8>,
}

impl VintWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Insert `bytes` at the front, keeping their order.
    pub fn prepend_bytes(&mut self, bytes: &[u8]) {
        self.data.splice(0..0, bytes.iter().copied());
    }

    pub fn write_vint(&mut self, value: u64) {
        self.write_vint_min(value, 1);
    }

    /// Write a vint padded to at least `min_len` bytes.
    pub fn write_vint_min(&mut self, value: u64, min_len: usize) {
        self.write_bytes(&encode_vint(value, min_len));
    }

    pub fn prepend_vint(&mut self, value: u64) {
        self.prepend_bytes(&encode_vint(value, 1));
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn prepend_u32_le(&mut self, value: u32) {
        self.prepend_bytes(&value.to_le_bytes());
    }

    /// Write a vint length followed by the bytes themselves.
    pub fn write_prefixed_bytes(&mut self, bytes: &[u8]) {
        self.write_vint(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_vint() {
        // Values 0-127 fit in one byte
        assert_eq!(read_vint(&[0x00]), Some((0, 1)));
        assert_eq!(read_vint(&[0x7F]), Some((127, 1)));
        assert_eq!(read_vint(&[0x01]), Some((1, 1)));
    }

    #[test]
    fn test_two_byte_vint() {
        // 128 = 0x80 in first byte (continuation) + 0x01 in second
        assert_eq!(read_vint(&[0x80, 0x01]), Some((128, 2)));
        // 255 = 0xFF & 0x7F = 127, then 0x01 << 7 = 128
        assert_eq!(read_vint(&[0xFF, 0x01]), Some((255, 2)));
    }

    #[test]
    fn test_larger_vint() {
        // 16384 = 0x80, 0x80, 0x01
        assert_eq!(read_vint(&[0x80, 0x80, 0x01]), Some((16384, 3)));
    }

    #[test]
    fn test_vint_reader() {
        let data = [0x05, 0x80, 0x01, 0x7F];
        let mut reader = VintReader::new(&data);

        assert_eq!(reader.read(), Some(5));
        assert_eq!(reader.read(), Some(128));
        assert_eq!(reader.read(), Some(127));
        assert_eq!(reader.read(), None);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(read_vint(&[]), None);
    }

    #[test]
    fn test_incomplete_vint() {
        // Continuation bit set but no more bytes
        assert_eq!(read_vint(&[0x80]), None);
    }

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode_vint(0, 1), vec![0x00]);
        assert_eq!(encode_vint(0, 0), vec![0x00]);
        assert_eq!(encode_vint(0, 3), vec![0x80, 0x80, 0x00]);
    }

    #[test]
    fn test_encode_multi_byte() {
        assert_eq!(encode_vint(127, 1), vec![0x7F]);
        assert_eq!(encode_vint(128, 1), vec![0x80, 0x01]);
        assert_eq!(encode_vint(16384, 1), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_vint(u64::MAX, 1).len(), MAX_VINT_LEN);
    }

    #[test]
    fn test_padded_vint_reads_back_unchanged() {
        // 5 padded to 3 groups: 0x85 0x80 0x00
        let padded = encode_vint(5, 3);
        assert_eq!(padded, vec![0x85, 0x80, 0x00]);
        assert_eq!(read_vint(&padded), Some((5, 3)));

        // Already wider than the minimum: no padding added
        assert_eq!(encode_vint(300, 2), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_writer_prepend_keeps_order() {
        let mut w = VintWriter::new();
        w.write_bytes(b"body");
        w.prepend_bytes(b"ab");
        w.prepend_vint(200);
        w.prepend_u32_le(0x0403_0201);
        assert_eq!(
            w.as_bytes(),
            &[0x01, 0x02, 0x03, 0x04, 0xC8, 0x01, b'a', b'b', b'b', b'o', b'd', b'y']
        );
        assert_eq!(w.len(), 12);
    }

    #[test]
    fn test_writer_prefixed_bytes() {
        let mut w = VintWriter::new();
        assert!(w.is_empty());
        w.write_u32_le(7);
        w.write_prefixed_bytes(b"STM");
        assert_eq!(w.into_bytes(), vec![7, 0, 0, 0, 3, b'S', b'T', b'M']);
    }
}
