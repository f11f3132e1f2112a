//! QPR animation header parsing.
//!
//! The decompressed animation stream opens with four newline-terminated text
//! lines:
//!
//! | Line | Content | Rule |
//! |------|---------|------|
//! | 1 | version tag | must be exactly `qpr v1` |
//! | 2 | animation name | non-empty UTF-8 |
//! | 3 | audio flag | non-empty, not interpreted |
//! | 4 | duration in ms | non-negative base-10 integer, quantized to 20 ms |
//!
//! Frame records start immediately after the fourth terminator. The header's
//! byte length is the sum of the four lines including their terminators.

use std::num::IntErrorKind;

use crate::binary::read_line;
use crate::error::{ParserError, Result};
use crate::format::QPR_VERSION_TAG;
use crate::quantize::{quantize, DurationCorrection, DurationSource};

/// Parsed text header of a QPR stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationHeader {
    /// Version tag, always `qpr v1`.
    pub format_version: String,
    /// Name of the animation.
    pub name: String,
    /// Audio flag text. Its meaning is unknown; it is only required to exist.
    pub audio_flag: String,
    /// Duration as written in the header, saturated to `u64::MAX`.
    pub raw_duration_ms: u64,
    /// Duration after quantization to the playback grid.
    pub declared_duration_ms: u64,
    /// Set when the declared duration had to be corrected.
    pub correction: Option<DurationCorrection>,
    /// Exact number of bytes the four header lines occupy.
    pub byte_length: usize,
    /// Bytes left in the stream after the header.
    pub length_without_header: usize,
}

impl AnimationHeader {
    /// Parses the header at the start of a decompressed QPR stream.
    ///
    /// # Errors
    ///
    /// - `ParserError::InvalidHeader` if a line is missing or empty, or the
    ///   name is not UTF-8
    /// - `ParserError::UnsupportedVersion` if the tag is not `qpr v1`
    /// - `ParserError::InvalidDuration` if the duration is not an integer
    ///
    /// # Example
    ///
    /// ```
    /// use q4x_parser::animation::AnimationHeader;
    ///
    /// let stream = b"qpr v1\nDemo\nyes\n1000\n\x00\x01";
    /// let header = AnimationHeader::parse(stream)?;
    /// assert_eq!(header.name, "Demo");
    /// assert_eq!(header.declared_duration_ms, 1000);
    /// assert_eq!(header.byte_length, 21);
    /// assert_eq!(header.frame_data(stream), &[0x00, 0x01]);
    /// # Ok::<(), q4x_parser::error::ParserError>(())
    /// ```
    pub fn parse(stream: &[u8]) -> Result<Self> {
        let mut lines = HeaderLines { stream, offset: 0 };

        let version = lines.next_line("version")?;
        let format_version = String::from_utf8_lossy(version).into_owned();
        if format_version != QPR_VERSION_TAG {
            return Err(ParserError::UnsupportedVersion {
                found: format_version,
            });
        }

        let name = std::str::from_utf8(lines.next_line("name")?)
            .map_err(|e| ParserError::InvalidHeader {
                reason: format!("name is not valid UTF-8: {e}"),
            })?
            .to_string();

        let audio_flag = String::from_utf8_lossy(lines.next_line("audio flag")?).into_owned();

        let duration_text = String::from_utf8_lossy(lines.next_line("duration")?);
        let trimmed = duration_text.trim();
        let raw_duration_ms = parse_duration(trimmed)?;

        let quantized = quantize(raw_duration_ms, DurationSource::Header);
        let byte_length = lines.offset;

        Ok(AnimationHeader {
            format_version,
            name,
            audio_flag,
            raw_duration_ms,
            declared_duration_ms: quantized.ms,
            correction: quantized.correction,
            byte_length,
            length_without_header: stream.len() - byte_length,
        })
    }

    /// Returns the part of `stream` that follows the header.
    ///
    /// `stream` must be the same buffer the header was parsed from.
    #[must_use]
    pub fn frame_data<'a>(&self, stream: &'a [u8]) -> &'a [u8] {
        stream.get(self.byte_length..).unwrap_or_default()
    }
}

/// Parses the duration line. Integers too large for `u64` saturate, since
/// the timeline clamps the header duration long before that.
fn parse_duration(text: &str) -> Result<u64> {
    match text.parse::<u64>() {
        Ok(ms) => Ok(ms),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(source) => Err(ParserError::InvalidDuration {
            text: text.to_string(),
            source,
        }),
    }
}

/// Cursor over the header lines that tracks the consumed byte count.
struct HeaderLines<'a> {
    stream: &'a [u8],
    offset: usize,
}

impl<'a> HeaderLines<'a> {
    /// Returns the next line without its terminator, rejecting absent or
    /// empty lines.
    fn next_line(&mut self, what: &str) -> Result<&'a [u8]> {
        let line = read_line(self.stream, self.offset).ok_or_else(|| ParserError::InvalidHeader {
            reason: format!("missing {what} line"),
        })?;
        self.offset += line.len();

        let text = line.strip_suffix(b"\n").unwrap_or(line);
        if text.is_empty() {
            return Err(ParserError::InvalidHeader {
                reason: format!("empty {what} line"),
            });
        }
        Ok(text)
    }
}
