//! Error types for the Q4X light show parser.
//!
//! Every violation of the container or animation stream layout aborts the
//! current file with one of these errors. There is no partial-output mode:
//! either a complete timeline is produced or an error is returned.
//!
//! Decompression failures are reported through their own variant so callers
//! can tell a corrupt payload apart from a file in the wrong format (see
//! [`ParserError::is_corrupt_payload`]).

use std::num::ParseIntError;

use thiserror::Error;

/// The main error type for Q4X parsing operations.
///
/// This enum covers all error cases that can occur while decoding a show:
/// - File I/O failures (including the temporary audio file)
/// - Unrecognized magic bytes or matrix dimensions
/// - Missing or truncated sub-blocks
/// - Corrupt compressed animation data
/// - Malformed animation headers and frame records
///
/// # Example
///
/// ```
/// use q4x_parser::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::InvalidHeader {
///         reason: "missing name line".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading the show file or writing the
    /// extracted audio payload.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file's magic bytes are neither `Q4X1` nor `Q4X2`.
    #[error("bad magic: expected {expected}, found {found}")]
    InvalidMagic {
        /// The accepted magic tags (as text for display).
        expected: String,
        /// The bytes actually found (as hex string).
        found: String,
    },

    /// A matrix dimension does not equal the fixed constant for its axis.
    #[error("bad {axis}: expected {expected}, found {found}")]
    InvalidDimension {
        /// Which axis failed validation.
        axis: Axis,
        /// The configured matrix size for this axis.
        expected: u16,
        /// The value stored in the container.
        found: u16,
    },

    /// A required sub-block is absent, has a zero length, or is shorter than
    /// its declared length.
    #[error("missing {block}")]
    MissingBlock {
        /// The block that could not be read.
        block: Block,
    },

    /// Inflating the animation block failed.
    ///
    /// This is the only variant that signals a corrupt payload rather than a
    /// structural format violation.
    #[error("corrupt animation block: {reason}")]
    DecompressionError {
        /// A description of the decompression failure.
        reason: String,
    },

    /// The text header of the animation stream is incomplete or malformed.
    #[error("invalid header: {reason}")]
    InvalidHeader {
        /// A description of what makes the header invalid.
        reason: String,
    },

    /// The animation stream declares a version tag other than `qpr v1`.
    #[error("unsupported version: {found:?}")]
    UnsupportedVersion {
        /// The version line as found in the stream, without terminator.
        found: String,
    },

    /// The declared duration line is not a base-10 integer.
    #[error("invalid duration {text:?}: {source}")]
    InvalidDuration {
        /// The offending line, trimmed.
        text: String,
        /// The underlying integer parse failure.
        #[source]
        source: ParseIntError,
    },

    /// A frame record ended before its pixel block or duration field was
    /// complete.
    #[error("truncated frame {index}: expected {expected} bytes, but only {available} available")]
    TruncatedFrame {
        /// Zero-based index of the frame being decoded.
        index: usize,
        /// Bytes needed to complete the record field.
        expected: usize,
        /// Bytes actually left in the stream.
        available: usize,
    },

    /// The data ended unexpectedly before the required bytes could be read.
    #[error("Unexpected end of data: expected {expected} bytes, but only {available} available")]
    UnexpectedEof {
        /// The number of bytes that were expected to be available.
        expected: usize,
        /// The actual number of bytes available.
        available: usize,
    },

    /// A decoder configuration value is unusable.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Which setting is wrong and why.
        reason: String,
    },
}

/// A matrix axis, used to report dimension mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal cell count.
    Width,
    /// Vertical cell count.
    Height,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

/// A container sub-block, used to report missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// The opaque QP4 block.
    Primary,
    /// The compressed QPR animation block.
    Animation,
    /// The trailing Ogg/MP3 payload.
    Audio,
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Block::Primary => f.write_str("primary block"),
            Block::Animation => f.write_str("animation block"),
            Block::Audio => f.write_str("audio payload"),
        }
    }
}

impl ParserError {
    /// Creates an `InvalidMagic` error for a tag that matched no known version.
    ///
    /// # Example
    ///
    /// ```
    /// use q4x_parser::error::ParserError;
    ///
    /// let err = ParserError::invalid_magic(&[b"Q4X1", b"Q4X2"], b"RIFF");
    /// assert!(err.to_string().contains("bad magic"));
    /// ```
    #[must_use]
    pub fn invalid_magic(expected: &[&[u8; 4]], found: &[u8]) -> Self {
        ParserError::InvalidMagic {
            expected: expected
                .iter()
                .map(|tag| String::from_utf8_lossy(&tag[..]).into_owned())
                .collect::<Vec<_>>()
                .join(" or "),
            found: bytes_to_hex(found),
        }
    }

    /// Creates an `UnexpectedEof` error with the given sizes.
    #[must_use]
    pub fn unexpected_eof(expected: usize, available: usize) -> Self {
        ParserError::UnexpectedEof { expected, available }
    }

    /// Creates a `MissingBlock` error for the given block.
    #[must_use]
    pub fn missing(block: Block) -> Self {
        ParserError::MissingBlock { block }
    }

    /// Returns whether this error means the payload was corrupt rather than
    /// structurally wrong.
    #[must_use]
    pub fn is_corrupt_payload(&self) -> bool {
        matches!(self, ParserError::DecompressionError { .. })
    }

    /// Returns whether this error is a violation of the file format.
    ///
    /// I/O and configuration errors are not format errors, and neither is a
    /// corrupt payload.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            ParserError::IoError(_)
                | ParserError::DecompressionError { .. }
                | ParserError::InvalidConfig { .. }
        )
    }
}

/// Converts a byte slice to a hexadecimal string representation.
///
/// If the slice is 8 bytes or less, formats as space-separated hex values.
/// If longer, shows the first 8 bytes followed by "...".
fn bytes_to_hex(bytes: &[u8]) -> String {
    let shown = &bytes[..bytes.len().min(8)];
    let prefix = shown
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");

    if bytes.len() <= 8 {
        prefix
    } else {
        format!("{prefix}... ({} bytes total)", bytes.len())
    }
}

/// A specialized Result type for Q4X parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;
