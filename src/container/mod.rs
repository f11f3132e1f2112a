//! Q4X container parsing.
//!
//! # Layout
//!
//! All integers are big-endian.
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | `magic` | 4 | `Q4X1` or `Q4X2` |
//! | `width` | 2 | Matrix width, must equal the configured width |
//! | `height` | 2 | Matrix height, must equal the configured height |
//! | `qp4_len` | 4 | Length of the primary block (nonzero) |
//! | `qp4` | `qp4_len` | Opaque, skipped |
//! | `qpr_len` | 4 | Length of the compressed animation (nonzero) |
//! | `qpr` | `qpr_len` | zlib-compressed QPR stream |
//! | `audio_len` | 4 | Soundtrack length, 0 if absent |
//! | `audio` | `audio_len` | Ogg or MP3 bytes |
//!
//! The primary block is consumed by a different pipeline; only its position
//! is recorded here.
//!
//! # Example
//!
//! ```no_run
//! use q4x_parser::config::DecoderConfig;
//! use q4x_parser::container::Container;
//!
//! let container = Container::read("show.q4x", &DecoderConfig::default())?;
//! println!("{} with {} compressed animation bytes", container.version, container.animation_block.len());
//!
//! let (animation, audio) = container.unpack()?;
//! if let Some(audio) = &audio {
//!     println!("soundtrack at {}", audio.path().display());
//! }
//! # Ok::<(), q4x_parser::error::ParserError>(())
//! ```

pub mod audio;

pub use audio::{AudioPayload, ExtractedAudio};

use std::path::Path;

use log::debug;

use crate::binary::{read_bytes, read_u16_be, read_u32_be, remaining};
use crate::config::DecoderConfig;
use crate::decompress::inflate_animation;
use crate::error::{Axis, Block, ParserError, Result};
use crate::format::{detect_version, ContainerVersion};

/// Size of the fixed prefix: magic, width, height.
pub const CONTAINER_PREFIX_SIZE: usize = 8;

/// Position of a block inside the container file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Offset of the first payload byte.
    pub offset: usize,
    /// Declared payload length.
    pub len: usize,
}

/// A validated Q4X container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Version declared by the magic tag.
    pub version: ContainerVersion,
    /// Matrix width (equal to the configured width).
    pub width: u16,
    /// Matrix height (equal to the configured height).
    pub height: u16,
    /// Where the skipped QP4 block sits in the file.
    pub primary_block: BlockSpan,
    /// The still-compressed QPR animation stream.
    pub animation_block: Vec<u8>,
    /// The soundtrack, if the container carries one.
    pub audio: Option<AudioPayload>,
}

impl Container {
    /// Reads and validates a container from disk.
    ///
    /// # Errors
    ///
    /// `ParserError::IoError` if the file cannot be read, otherwise as
    /// [`Container::parse`].
    pub fn read(path: impl AsRef<Path>, config: &DecoderConfig) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        debug!("read {} ({} bytes)", path.as_ref().display(), data.len());
        Self::parse(&data, config)
    }

    /// Parses and validates a container from raw bytes.
    ///
    /// # Errors
    ///
    /// - `ParserError::InvalidMagic` for a tag other than `Q4X1`/`Q4X2`, or
    ///   data too short to hold one
    /// - `ParserError::InvalidDimension` if width or height differs from the config
    /// - `ParserError::MissingBlock` for an empty primary or animation block, or
    ///   an animation/audio block shorter than declared
    /// - `ParserError::UnexpectedEof` if a length field is cut off
    pub fn parse(data: &[u8], config: &DecoderConfig) -> Result<Self> {
        let version = detect_version(data)?;

        let width = read_u16_be(data, 4)?;
        check_dimension(Axis::Width, config.matrix_width, width)?;

        let height = read_u16_be(data, 6)?;
        check_dimension(Axis::Height, config.matrix_height, height)?;

        let mut offset = CONTAINER_PREFIX_SIZE;

        // QP4: skipped without materializing
        let primary_len = read_u32_be(data, offset)? as usize;
        offset += 4;
        if primary_len == 0 {
            return Err(ParserError::missing(Block::Primary));
        }
        let primary_block = BlockSpan {
            offset,
            len: primary_len,
        };
        offset = offset.saturating_add(primary_len);

        // QPR
        let animation_len = read_u32_be(data, offset)? as usize;
        offset += 4;
        if animation_len == 0 {
            return Err(ParserError::missing(Block::Animation));
        }
        let animation_block = read_bytes(data, offset, animation_len)
            .map_err(|_| ParserError::missing(Block::Animation))?
            .to_vec();
        offset += animation_len;

        let audio = read_audio(data, offset)?;

        debug!(
            "{version} container: {width}x{height}, qp4 {primary_len} bytes, qpr {animation_len} bytes, audio {}",
            audio
                .as_ref()
                .map_or_else(|| "none".to_string(), |a| format!("{} bytes {:?}", a.len(), a.format)),
        );

        Ok(Container {
            version,
            width,
            height,
            primary_block,
            animation_block,
            audio,
        })
    }

    /// Inflates the animation block without consuming the container.
    ///
    /// # Errors
    ///
    /// `ParserError::DecompressionError` if the block is not valid zlib data.
    pub fn inflate_animation(&self) -> Result<Vec<u8>> {
        inflate_animation(&self.animation_block)
    }

    /// Hands the container's payloads to the next stages.
    ///
    /// Returns the decompressed QPR stream and, if present, the soundtrack
    /// persisted to a temporary file. The animation is inflated first, so a
    /// corrupt payload never leaves a file behind.
    ///
    /// # Errors
    ///
    /// `ParserError::DecompressionError` for a corrupt animation block,
    /// `ParserError::IoError` if the audio file cannot be written.
    pub fn unpack(self) -> Result<(Vec<u8>, Option<ExtractedAudio>)> {
        let animation = self.inflate_animation()?;
        let audio = self.audio.as_ref().map(AudioPayload::persist).transpose()?;
        Ok((animation, audio))
    }

    /// Size of one pixel block for this container's matrix.
    #[must_use]
    pub fn pixel_block_size(&self) -> usize {
        crate::format::pixel_block_size(self.width, self.height)
    }
}

fn check_dimension(axis: Axis, expected: u16, found: u16) -> Result<()> {
    if found == 0 || found != expected {
        return Err(ParserError::InvalidDimension {
            axis,
            expected,
            found,
        });
    }
    Ok(())
}

/// Reads the trailing soundtrack.
///
/// A file that ends exactly after the animation block has no soundtrack.
fn read_audio(data: &[u8], offset: usize) -> Result<Option<AudioPayload>> {
    if remaining(data, offset) == 0 {
        return Ok(None);
    }

    let audio_len = read_u32_be(data, offset)? as usize;
    if audio_len == 0 {
        return Ok(None);
    }

    let payload = read_bytes(data, offset + 4, audio_len)
        .map_err(|_| ParserError::missing(Block::Audio))?;

    Ok(Some(AudioPayload::new(payload.to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AudioFormat;

    /// Builds a container around an already-compressed animation block.
    fn build(magic: &[u8; 4], width: u16, height: u16, qp4: &[u8], qpr: &[u8], audio: &[u8]) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend(width.to_be_bytes());
        data.extend(height.to_be_bytes());
        data.extend((qp4.len() as u32).to_be_bytes());
        data.extend(qp4);
        data.extend((qpr.len() as u32).to_be_bytes());
        data.extend(qpr);
        data.extend((audio.len() as u32).to_be_bytes());
        data.extend(audio);
        data
    }

    fn config() -> DecoderConfig {
        DecoderConfig::default()
    }

    #[test]
    fn test_parse_minimal() {
        let data = build(b"Q4X1", 32, 26, &[0xAA], b"compressed", &[]);
        let container = Container::parse(&data, &config()).unwrap();

        assert_eq!(container.version, ContainerVersion::Q4x1);
        assert_eq!((container.width, container.height), (32, 26));
        assert_eq!(container.primary_block, BlockSpan { offset: 12, len: 1 });
        assert_eq!(container.animation_block, b"compressed");
        assert!(container.audio.is_none());
        assert_eq!(container.pixel_block_size(), 2496);
    }

    #[test]
    fn test_parse_q4x2_with_audio() {
        let data = build(b"Q4X2", 32, 26, &[1, 2, 3], b"qpr", b"OggSxyz");
        let container = Container::parse(&data, &config()).unwrap();

        assert_eq!(container.version, ContainerVersion::Q4x2);
        let audio = container.audio.unwrap();
        assert_eq!(audio.format, AudioFormat::Ogg);
        assert_eq!(audio.data, b"OggSxyz");
    }

    #[test]
    fn test_missing_audio_length_means_no_audio() {
        let mut data = build(b"Q4X1", 32, 26, &[0], b"qpr", &[]);
        data.truncate(data.len() - 4);
        let container = Container::parse(&data, &config()).unwrap();
        assert!(container.audio.is_none());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let data = build(b"Q4X9", 32, 26, &[0], b"qpr", &[]);
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_rejects_input_shorter_than_magic() {
        for data in [&b""[..], b"Q", b"Q4", b"Q4X"] {
            let err = Container::parse(data, &config()).unwrap_err();
            assert!(matches!(err, ParserError::InvalidMagic { .. }), "{data:?}: {err}");
            assert!(err.to_string().starts_with("bad magic"));
        }
    }

    #[test]
    fn test_rejects_bad_width_and_height() {
        for (width, height, axis) in [
            (0, 26, Axis::Width),
            (31, 26, Axis::Width),
            (64, 26, Axis::Width),
            (32, 0, Axis::Height),
            (32, 27, Axis::Height),
        ] {
            let data = build(b"Q4X1", width, height, &[0], b"qpr", &[]);
            match Container::parse(&data, &config()) {
                Err(ParserError::InvalidDimension { axis: found, .. }) => assert_eq!(found, axis),
                other => panic!("{width}x{height}: expected dimension error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_empty_primary_block() {
        let data = build(b"Q4X1", 32, 26, &[], b"qpr", &[]);
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::MissingBlock { block: Block::Primary })
        ));
    }

    #[test]
    fn test_rejects_empty_animation_block() {
        let data = build(b"Q4X1", 32, 26, &[0], &[], &[]);
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::MissingBlock { block: Block::Animation })
        ));
    }

    #[test]
    fn test_rejects_short_animation_block() {
        let mut data = build(b"Q4X1", 32, 26, &[0], &[], &[]);
        // Rewrite qpr_len to claim 100 bytes with only 4 following
        data[13..17].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::MissingBlock { block: Block::Animation })
        ));
    }

    #[test]
    fn test_rejects_short_audio() {
        let mut data = build(b"Q4X1", 32, 26, &[0], b"qpr", b"OggS");
        data.truncate(data.len() - 2);
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::MissingBlock { block: Block::Audio })
        ));
    }

    #[test]
    fn test_primary_block_overrun_is_eof() {
        let mut data = build(b"Q4X1", 32, 26, &[0], b"qpr", &[]);
        data[8..12].copy_from_slice(&1_000u32.to_be_bytes());
        assert!(matches!(
            Container::parse(&data, &config()),
            Err(ParserError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_custom_matrix_config() {
        let config = DecoderConfig {
            matrix_width: 4,
            matrix_height: 2,
            ..DecoderConfig::default()
        };
        let data = build(b"Q4X1", 4, 2, &[0], b"qpr", &[]);
        assert!(Container::parse(&data, &config).is_ok());

        let data = build(b"Q4X1", 32, 26, &[0], b"qpr", &[]);
        assert!(Container::parse(&data, &config).is_err());
    }

    #[test]
    fn test_unpack_corrupt_animation() {
        let data = build(b"Q4X1", 32, 26, &[0], b"not zlib", b"OggS");
        let container = Container::parse(&data, &config()).unwrap();
        let err = container.unpack().unwrap_err();
        assert!(err.is_corrupt_payload());
    }
}
