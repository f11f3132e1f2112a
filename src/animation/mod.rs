//! Decompressed QPR animation stream parsing.
//!
//! A QPR stream is a four-line text header followed by fixed-size frame
//! records:
//!
//! 1. **Header** ([`AnimationHeader`]): version tag, name, audio flag and
//!    declared duration, one per line
//! 2. **Frames** ([`FrameDecoder`]): `width * height * 3` RGB bytes plus a
//!    big-endian `u32` duration, repeated until the stream ends
//!
//! # Example
//!
//! ```no_run
//! use q4x_parser::animation::{AnimationHeader, FrameDecoder};
//! use q4x_parser::config::DecoderConfig;
//! use q4x_parser::container::Container;
//!
//! let config = DecoderConfig::default();
//! let stream = Container::read("show.q4x", &config)?.inflate_animation()?;
//!
//! let header = AnimationHeader::parse(&stream)?;
//! println!("{}: {} ms", header.name, header.declared_duration_ms);
//!
//! let decoder = FrameDecoder::new(header.frame_data(&stream), config.matrix_width, config.matrix_height);
//! for frame in decoder {
//!     let frame = frame?;
//!     println!("frame {} shown for {} ms", frame.index, frame.duration_ms);
//! }
//! # Ok::<(), q4x_parser::error::ParserError>(())
//! ```

pub mod frame;
pub mod header;

pub use frame::{Cell, DecodedFrame, Frame, FrameDecoder, NeverStop};
pub use header::AnimationHeader;
