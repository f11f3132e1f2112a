//! Format detection and constants for Q4X light show files.
//!
//! A Q4X file is an outer container (magic `Q4X1` or `Q4X2`) around a
//! zlib-compressed QPR animation stream and an optional audio payload.
//! Both container versions share the same layout; the tag is kept so tools
//! can report which one they saw.
//!
//! # Example
//!
//! ```
//! use q4x_parser::format::{detect_version, AudioFormat, ContainerVersion};
//!
//! assert!(matches!(detect_version(b"Q4X2\x00\x20"), Ok(ContainerVersion::Q4x2)));
//! assert_eq!(AudioFormat::sniff(b"OggS\x00\x02"), AudioFormat::Ogg);
//! assert_eq!(AudioFormat::sniff(b"ID3\x04"), AudioFormat::Mp3);
//! ```

use serde::Serialize;

use crate::error::{ParserError, Result};

/// Magic bytes for version 1 containers.
pub const Q4X1_MAGIC: &[u8; 4] = b"Q4X1";

/// Magic bytes for version 2 containers.
pub const Q4X2_MAGIC: &[u8; 4] = b"Q4X2";

/// Every accepted container magic, in version order.
pub const KNOWN_MAGICS: [&[u8; 4]; 2] = [Q4X1_MAGIC, Q4X2_MAGIC];

/// Number of window pixel columns in the matrix.
pub const MATRIX_WIDTH: u16 = 32;

/// Number of window pixel rows in the matrix.
pub const MATRIX_HEIGHT: u16 = 26;

/// Bytes per cell (red, green, blue).
pub const CHANNELS: usize = 3;

/// Size of the big-endian duration field following each pixel block.
pub const FRAME_DURATION_SIZE: usize = 4;

/// The only QPR stream version tag this parser understands.
pub const QPR_VERSION_TAG: &str = "qpr v1";

/// Playback rate of the light show, in frames per second.
pub const PLAYBACK_FPS: u32 = 50;

/// Length of one playback tick in milliseconds (1000 / 50 Hz).
pub const TICK_MS: u64 = 20;

/// Longest output any show may produce: three minutes.
pub const MAX_DURATION_MS: u64 = 180_000;

/// Capture pattern at the start of every Ogg page.
pub const OGG_MAGIC: &[u8; 4] = b"OggS";

/// Returns the byte size of one pixel block for the given matrix.
///
/// ```
/// use q4x_parser::format::{pixel_block_size, MATRIX_HEIGHT, MATRIX_WIDTH};
///
/// assert_eq!(pixel_block_size(MATRIX_WIDTH, MATRIX_HEIGHT), 2496);
/// ```
#[must_use]
pub const fn pixel_block_size(width: u16, height: u16) -> usize {
    width as usize * height as usize * CHANNELS
}

/// The container version declared by the magic tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContainerVersion {
    /// `Q4X1`
    Q4x1,
    /// `Q4X2`
    Q4x2,
}

impl ContainerVersion {
    /// Returns the magic bytes for this version.
    #[must_use]
    pub const fn magic(&self) -> &'static [u8; 4] {
        match self {
            ContainerVersion::Q4x1 => Q4X1_MAGIC,
            ContainerVersion::Q4x2 => Q4X2_MAGIC,
        }
    }
}

impl std::fmt::Display for ContainerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerVersion::Q4x1 => f.write_str("Q4X1"),
            ContainerVersion::Q4x2 => f.write_str("Q4X2"),
        }
    }
}

/// Detects the container version from the first four bytes of a file.
///
/// # Errors
///
/// Returns `ParserError::InvalidMagic` if the tag is not `Q4X1` or `Q4X2`,
/// including when the data is too short to hold a tag at all.
pub fn detect_version(data: &[u8]) -> Result<ContainerVersion> {
    match data.get(..4) {
        Some(tag) if tag == Q4X1_MAGIC => Ok(ContainerVersion::Q4x1),
        Some(tag) if tag == Q4X2_MAGIC => Ok(ContainerVersion::Q4x2),
        Some(tag) => Err(ParserError::invalid_magic(&KNOWN_MAGICS, tag)),
        None => Err(ParserError::invalid_magic(&KNOWN_MAGICS, data)),
    }
}

/// Container format of the embedded soundtrack.
///
/// The container does not declare it; it is sniffed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Ogg (Vorbis/Opus) stream, recognized by its `OggS` capture pattern.
    Ogg,
    /// Anything else is assumed to be MP3.
    Mp3,
}

impl AudioFormat {
    /// Determines the audio format from the first bytes of the payload.
    #[must_use]
    pub fn sniff(payload: &[u8]) -> Self {
        if payload.starts_with(OGG_MAGIC) {
            AudioFormat::Ogg
        } else {
            AudioFormat::Mp3
        }
    }

    /// File extension used when persisting the payload.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Ogg => "ogg",
            AudioFormat::Mp3 => "mp3",
        }
    }
}
