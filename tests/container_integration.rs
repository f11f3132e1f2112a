//! Integration tests for container parsing and soundtrack extraction.
//!
//! Shows are built in memory and, where the API reads from disk, written to
//! a temporary directory first.

mod common;

use common::{demo_stream, ContainerBuilder, StreamBuilder};
use q4x_parser::container::Container;
use q4x_parser::error::{Axis, Block};
use q4x_parser::{
    decode_animation, decode_bytes, decode_file, AudioFormat, ContainerVersion, DecoderConfig,
    ParserError,
};

fn config() -> DecoderConfig {
    DecoderConfig::default()
}

// ============================================================================
// Magic and Dimensions
// ============================================================================

#[test]
fn test_both_versions_decode() {
    for (magic, version) in [(b"Q4X1", ContainerVersion::Q4x1), (b"Q4X2", ContainerVersion::Q4x2)] {
        let data = ContainerBuilder::new(&demo_stream()).magic(magic).build();
        let show = decode_bytes(&data, &config()).unwrap();
        assert_eq!(show.version, version);
    }
}

#[test]
fn test_unknown_magic_rejected() {
    for magic in [b"Q4X0", b"Q4X3", b"QPR1", b"RIFF"] {
        let data = ContainerBuilder::new(&demo_stream()).magic(magic).build();
        let err = decode_bytes(&data, &config()).unwrap_err();
        assert!(matches!(err, ParserError::InvalidMagic { .. }), "{magic:?}: {err}");
        assert!(err.is_format_error());
    }
}

#[test]
fn test_dimensions_must_match_exactly() {
    let cases = [
        (0, 26, Axis::Width),
        (16, 26, Axis::Width),
        (33, 26, Axis::Width),
        (32, 0, Axis::Height),
        (32, 13, Axis::Height),
        (32, 52, Axis::Height),
    ];

    for (width, height, axis) in cases {
        let data = ContainerBuilder::new(&demo_stream())
            .dimensions(width, height)
            .build();
        match decode_bytes(&data, &config()) {
            Err(ParserError::InvalidDimension { axis: found, .. }) => assert_eq!(found, axis),
            other => panic!("{width}x{height}: unexpected {other:?}"),
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_primary_block_is_skipped_not_parsed() {
    let primary: Vec<u8> = (0..=255).collect();
    let data = ContainerBuilder::new(&demo_stream()).primary(&primary).build();

    let container = Container::parse(&data, &config()).unwrap();
    assert_eq!(container.primary_block.offset, 12);
    assert_eq!(container.primary_block.len, 256);
    assert!(decode_bytes(&data, &config()).is_ok());
}

#[test]
fn test_missing_primary_block() {
    let data = ContainerBuilder::new(&demo_stream()).primary(&[]).build();
    assert!(matches!(
        decode_bytes(&data, &config()),
        Err(ParserError::MissingBlock { block: Block::Primary })
    ));
}

#[test]
fn test_missing_animation_block_before_decompression() {
    let data = ContainerBuilder::new(&demo_stream()).raw_animation(&[]).build();
    let err = decode_bytes(&data, &config()).unwrap_err();

    assert!(matches!(err, ParserError::MissingBlock { block: Block::Animation }));
    assert_eq!(err.to_string(), "missing animation block");
    assert!(!err.is_corrupt_payload());
}

#[test]
fn test_corrupt_animation_block_is_distinct() {
    let data = ContainerBuilder::new(&demo_stream())
        .raw_animation(b"\x00\x01\x02\x03 not zlib")
        .build();
    let err = decode_bytes(&data, &config()).unwrap_err();

    assert!(err.is_corrupt_payload());
    assert!(!err.is_format_error());
}

#[test]
fn test_short_audio_payload() {
    let mut data = ContainerBuilder::new(&demo_stream()).audio(b"OggS0123456789").build();
    data.truncate(data.len() - 5);

    assert!(matches!(
        decode_bytes(&data, &config()),
        Err(ParserError::MissingBlock { block: Block::Audio })
    ));
}

// ============================================================================
// Soundtrack
// ============================================================================

#[test]
fn test_ogg_audio_extracted_to_temp_file() {
    let audio = b"OggS\x00\x02ogg page bytes".to_vec();
    let data = ContainerBuilder::new(&demo_stream()).audio(&audio).build();

    let show = decode_bytes(&data, &config()).unwrap();
    let extracted = show.audio.as_ref().expect("soundtrack");
    assert_eq!(extracted.format(), AudioFormat::Ogg);
    assert_eq!(extracted.path().extension().unwrap(), "ogg");
    assert_eq!(std::fs::read(extracted.path()).unwrap(), audio);

    let path = extracted.path().to_path_buf();
    drop(show);
    assert!(!path.exists(), "soundtrack should be removed with the show");
}

#[test]
fn test_non_ogg_audio_assumed_mp3() {
    let data = ContainerBuilder::new(&demo_stream())
        .audio(b"ID3\x04\x00mp3 frames")
        .build();

    let show = decode_bytes(&data, &config()).unwrap();
    let extracted = show.audio.unwrap();
    assert_eq!(extracted.format(), AudioFormat::Mp3);
    assert_eq!(extracted.path().extension().unwrap(), "mp3");
}

#[test]
fn test_no_audio() {
    let show = decode_bytes(&ContainerBuilder::new(&demo_stream()).build(), &config()).unwrap();
    assert!(show.audio.is_none());
}

#[test]
fn test_audio_removed_when_animation_fails() {
    // Header is fine, frame is one byte short
    let stream = StreamBuilder::new("Broken", "yes", "1000")
        .raw(&vec![0u8; common::BLOCK - 1])
        .build();
    let data = ContainerBuilder::new(&stream).audio(b"OggSdata").build();

    let container = Container::parse(&data, &config()).unwrap();
    let (animation, audio) = container.unpack().unwrap();
    let audio = audio.unwrap();
    let path = audio.path().to_path_buf();
    assert!(path.exists());

    let result = decode_animation(&animation, &config()).map(|decoded| (decoded, audio));
    assert!(matches!(result, Err(ParserError::TruncatedFrame { .. })));
    assert!(!path.exists(), "soundtrack should be removed on failure");
}

// ============================================================================
// Files on Disk
// ============================================================================

#[test]
fn test_decode_file_and_container_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.q4x");
    std::fs::write(&path, ContainerBuilder::new(&demo_stream()).build()).unwrap();

    let container = Container::read(&path, &config()).unwrap();
    assert_eq!(container.inflate_animation().unwrap(), demo_stream());

    let show = decode_file(&path, &config()).unwrap();
    assert_eq!(show.header.name, "Demo");
}

#[test]
fn test_decode_missing_file() {
    assert!(matches!(
        decode_file("/nonexistent/show.q4x", &config()),
        Err(ParserError::IoError(_))
    ));
}

#[test]
fn test_custom_matrix_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("small.json");
    std::fs::write(&config_path, r#"{ "matrix_width": 2, "matrix_height": 1 }"#).unwrap();
    let config = DecoderConfig::from_json_file(&config_path).unwrap();

    let stream = StreamBuilder::new("Tiny", "no", "40")
        .frame_pixels(&[255, 0, 0, 0, 0, 255], 40)
        .build();
    let data = ContainerBuilder::new(&stream).dimensions(2, 1).build();

    let show = decode_bytes(&data, &config).unwrap();
    let frame = &show.timeline.entries()[0].frame;
    assert_eq!(frame.color(0, 0), [1.0, 0.0, 0.0]);
    assert_eq!(frame.color(0, 1), [0.0, 0.0, 1.0]);
}
