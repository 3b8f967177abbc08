//! Binary primitives of the dictionary format
//!
//! Every multi-byte integer in the file is little endian. Strings are
//! encoded in a declared charset and followed by a terminator whose
//! length is the charset's code unit width (one zero byte for UTF-8,
//! two for UTF-16LE).

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

/// Charsets a dictionary file uses. Articles and the word list are UTF-8;
/// trie edge labels are UTF-16LE so that label lengths stay trivially
/// computable on the device (variable-width surrogate pairs are ignored,
/// as the on-device reader does).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Utf16Le,
}

impl Charset {
    /// Width of a code unit, which is also the length of the terminator
    pub fn terminator_len(&self) -> usize {
        match self {
            Charset::Utf8 => 1,
            Charset::Utf16Le => 2,
        }
    }

    /// Encodes a string without its terminator
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Utf16Le => {
                let mut buffer = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    buffer.extend_from_slice(&unit.to_le_bytes());
                }
                buffer
            }
        }
    }
}

/// Writes a little endian u16, returning the number of bytes written
/// so that callers can accumulate block sizes
pub fn write_u16(out: &mut dyn Write, n: u16) -> Result<usize, std::io::Error> {
    out.write_u16::<LittleEndian>(n)?;
    Ok(2)
}

/// Writes a little endian u32, returning the number of bytes written
pub fn write_u32(out: &mut dyn Write, n: u32) -> Result<usize, std::io::Error> {
    out.write_u32::<LittleEndian>(n)?;
    Ok(4)
}

/// Writes a charset-encoded string followed by its terminator
pub fn write_terminated(
    out: &mut dyn Write,
    charset: Charset,
    text: &str,
) -> Result<usize, std::io::Error> {
    let bytes = charset.encode(text);
    out.write_all(&bytes)?;
    let terminator = [0u8; 2];
    out.write_all(&terminator[..charset.terminator_len()])?;
    Ok(bytes.len() + charset.terminator_len())
}

/// Reads a little endian u16 from a byte slice
pub fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little endian u32 from a byte slice
pub fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        let mut buffer = Vec::new();
        assert_eq!(write_u16(&mut buffer, 0x0102).unwrap(), 2);
        assert_eq!(write_u32(&mut buffer, 0x03040506).unwrap(), 4);
        assert_eq!(buffer, vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);

        assert_eq!(read_u16(&buffer, 0), Some(0x0102));
        assert_eq!(read_u32(&buffer, 2), Some(0x03040506));
        assert_eq!(read_u32(&buffer, 3), None);
    }

    #[test]
    fn test_terminated_utf8() {
        let mut buffer = Vec::new();
        let n = write_terminated(&mut buffer, Charset::Utf8, "ab").unwrap();
        assert_eq!(n, 3);
        assert_eq!(buffer, b"ab\0");
    }

    #[test]
    fn test_terminated_utf16() {
        let mut buffer = Vec::new();
        let n = write_terminated(&mut buffer, Charset::Utf16Le, "on").unwrap();
        assert_eq!(n, 6);
        assert_eq!(buffer, vec![b'o', 0, b'n', 0, 0, 0]);
    }

    #[test]
    fn test_encode_non_ascii() {
        // é is a single UTF-16 unit but two UTF-8 bytes
        assert_eq!(Charset::Utf8.encode("é"), vec![0xc3, 0xa9]);
        assert_eq!(Charset::Utf16Le.encode("é"), vec![0xe9, 0x00]);
    }
}
