//! # Q4X Parser
//!
//! A decoder for Q4X window light show files.
//!
//! A show is an animation on a fixed 32 × 26 pixel matrix (two pixels per
//! window, on a 16 × 13 window facade). The file holds a zlib-compressed QPR
//! animation stream and, optionally, a soundtrack. This library turns it into
//! an ordered list of RGB frames with display durations on the 50 Hz
//! playback grid, plus the total length the rendered video should have.
//! Drawing and video encoding are left to the caller.
//!
//! ## Quick Start
//!
//! ```no_run
//! use q4x_parser::{decode_file, DecoderConfig};
//!
//! let show = decode_file("show.q4x", &DecoderConfig::default())?;
//!
//! println!("{} ({})", show.header.name, show.version);
//! for entry in show.timeline.entries() {
//!     let [r, g, b] = entry.frame.color(0, 0);
//!     println!("top-left ({r:.2}, {g:.2}, {b:.2}) for {} s", entry.duration_secs());
//! }
//! println!("video length: {} s", show.timeline.output_duration_secs());
//!
//! if let Some(audio) = &show.audio {
//!     println!("soundtrack: {}", audio.path().display());
//! }
//! # Ok::<(), q4x_parser::ParserError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`binary`] - Big-endian integer and line reading helpers
//! - [`format`] - Magic tags, matrix constants, audio sniffing
//! - [`config`] - Decoder configuration (matrix size, runtime cap)
//! - [`container`] - Outer Q4X container and soundtrack extraction
//! - [`decompress`] - Inflating the QPR animation block
//! - [`animation`] - QPR header and frame record decoding
//! - [`quantize`] - Snapping durations onto the 20 ms playback grid
//! - [`timeline`] - Reconciling frame timing with the header, runtime cap
//! - [`pipeline`] - All stages end to end
//!
//! All multi-byte integers in the format are big-endian.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod binary;
pub mod config;
pub mod container;
pub mod decompress;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod quantize;
pub mod timeline;

// Re-export commonly used types at the crate root
pub use animation::{AnimationHeader, DecodedFrame, Frame, FrameDecoder};
pub use config::DecoderConfig;
pub use container::{AudioPayload, Container, ExtractedAudio};
pub use decompress::inflate_animation;
pub use error::{ParserError, Result};
pub use format::{AudioFormat, ContainerVersion};
pub use pipeline::{decode_animation, decode_bytes, decode_file, DecodedShow};
pub use quantize::{quantize, DurationCorrection, DurationSource};
pub use timeline::{Timeline, TimelineAssembler, TimelineEntry, TimelineSummary};
