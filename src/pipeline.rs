//! End-to-end decoding of a show file.
//!
//! Runs every stage in order: container, decompression, header, frames,
//! timeline. The result owns the extracted soundtrack file, if any, so it
//! lives exactly as long as the caller keeps the [`DecodedShow`]. On any
//! failure after the soundtrack was written, the file is removed before the
//! error is returned.

use std::path::Path;

use log::debug;

use crate::animation::{AnimationHeader, FrameDecoder};
use crate::config::DecoderConfig;
use crate::container::{Container, ExtractedAudio};
use crate::error::Result;
use crate::format::ContainerVersion;
use crate::timeline::{Timeline, TimelineAssembler};

/// Everything the external renderer needs to compose a video.
#[derive(Debug)]
pub struct DecodedShow {
    /// Container version tag.
    pub version: ContainerVersion,
    /// The animation's text header.
    pub header: AnimationHeader,
    /// Duration-resolved frames.
    pub timeline: Timeline,
    /// Soundtrack on disk, removed when this value is dropped.
    pub audio: Option<ExtractedAudio>,
}

/// Decodes the show stored at `path`.
///
/// # Errors
///
/// Any I/O, format, or decompression error from the individual stages.
pub fn decode_file(path: impl AsRef<Path>, config: &DecoderConfig) -> Result<DecodedShow> {
    let data = std::fs::read(path.as_ref())?;
    debug!("decoding {} ({} bytes)", path.as_ref().display(), data.len());
    decode_bytes(&data, config)
}

/// Decodes a show already loaded into memory.
///
/// # Errors
///
/// Any format or decompression error from the individual stages, or an I/O
/// error while writing the soundtrack.
pub fn decode_bytes(data: &[u8], config: &DecoderConfig) -> Result<DecodedShow> {
    config.validate()?;

    let container = Container::parse(data, config)?;
    let version = container.version;
    let (stream, audio) = container.unpack()?;

    // `audio` is dropped, and its file deleted, if this fails
    let (header, timeline) = decode_animation(&stream, config)?;

    Ok(DecodedShow {
        version,
        header,
        timeline,
        audio,
    })
}

/// Decodes a decompressed QPR stream into its header and timeline.
///
/// # Errors
///
/// Header errors, or a truncated frame record before the runtime cap.
pub fn decode_animation(stream: &[u8], config: &DecoderConfig) -> Result<(AnimationHeader, Timeline)> {
    let header = AnimationHeader::parse(stream)?;
    debug!(
        "animation {:?}: {} header bytes, {} frame bytes",
        header.name, header.byte_length, header.length_without_header
    );

    let decoder = FrameDecoder::new(
        header.frame_data(stream),
        config.matrix_width,
        config.matrix_height,
    );
    let timeline = TimelineAssembler::from_config(config).assemble(&header, decoder)?;

    Ok((header, timeline))
}
