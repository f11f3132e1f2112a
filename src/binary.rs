//! Binary reading utilities for parsing Q4X containers and QPR streams.
//!
//! This module provides functions for reading big-endian integers, byte
//! slices, and newline-terminated text lines from byte buffers. All
//! functions perform bounds checking and return appropriate errors for
//! truncated data.
//!
//! # Endianness
//!
//! Every multi-byte integer in the Q4X container and in QPR frame records
//! is stored big-endian.
//!
//! # Example
//!
//! ```
//! use q4x_parser::binary::{read_line, read_u16_be, read_u32_be};
//!
//! let data = [0x00, 0x20, 0x00, 0x00, 0x00, 0x14, b'h', b'i', b'\n'];
//!
//! assert_eq!(read_u16_be(&data, 0).unwrap(), 32);
//! assert_eq!(read_u32_be(&data, 2).unwrap(), 20);
//! assert_eq!(read_line(&data, 6), Some(&b"hi\n"[..]));
//! ```

use crate::error::{ParserError, Result};

/// Reads a big-endian u16 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the buffer doesn't contain
/// at least 2 bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use q4x_parser::binary::read_u16_be;
///
/// let data = [0x12, 0x34, 0xFF, 0xFF];
/// assert_eq!(read_u16_be(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_be(&data, 2).unwrap(), 0xFFFF);
/// ```
pub fn read_u16_be(bytes: &[u8], offset: usize) -> Result<u16> {
    let slice = read_bytes(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([slice[0], slice[1]]))
}

/// Reads a big-endian u32 value from the byte buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the buffer doesn't contain
/// at least 4 bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use q4x_parser::binary::read_u32_be;
///
/// let data = [0x00, 0x00, 0x00, 0x14];
/// assert_eq!(read_u32_be(&data, 0).unwrap(), 20);
/// ```
pub fn read_u32_be(bytes: &[u8], offset: usize) -> Result<u32> {
    let slice = read_bytes(bytes, offset, 4)?;
    Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Reads a slice of bytes from the buffer at the given offset.
///
/// # Errors
///
/// Returns `ParserError::UnexpectedEof` if the buffer doesn't contain
/// at least `len` bytes starting from the given offset.
///
/// # Example
///
/// ```
/// use q4x_parser::binary::read_bytes;
///
/// let data = b"Q4X1\x00\x20\x00\x1A";
/// let magic = read_bytes(data, 0, 4).unwrap();
/// assert_eq!(magic, b"Q4X1");
/// ```
pub fn read_bytes(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.saturating_add(len);
    if end > bytes.len() {
        return Err(ParserError::unexpected_eof(end, bytes.len()));
    }

    Ok(&bytes[offset..end])
}

/// Returns the number of bytes available from `offset` to the end of the buffer.
#[must_use]
pub fn remaining(bytes: &[u8], offset: usize) -> usize {
    bytes.len().saturating_sub(offset)
}

/// Reads one line starting at `offset`, including its `\n` terminator.
///
/// A final line without a terminator is returned as-is. Returns `None` when
/// `offset` is at or past the end of the buffer, so an absent line and an
/// empty buffer look the same to callers.
///
/// # Example
///
/// ```
/// use q4x_parser::binary::read_line;
///
/// let data = b"qpr v1\nDemo";
/// assert_eq!(read_line(data, 0), Some(&b"qpr v1\n"[..]));
/// assert_eq!(read_line(data, 7), Some(&b"Demo"[..]));
/// assert_eq!(read_line(data, 11), None);
/// ```
#[must_use]
pub fn read_line(bytes: &[u8], offset: usize) -> Option<&[u8]> {
    let rest = bytes.get(offset..).filter(|rest| !rest.is_empty())?;
    let len = rest
        .iter()
        .position(|&b| b == b'\n')
        .map_or(rest.len(), |pos| pos + 1);

    Some(&rest[..len])
}
