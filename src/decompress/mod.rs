//! Decompression of the QPR animation block.
//!
//! The animation block inside a Q4X container is a single zlib stream. It is
//! inflated fully into memory before the header and frames are parsed; a
//! three-minute show at 50 fps stays well under 25 MiB.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//!
//! use flate2::write::ZlibEncoder;
//! use flate2::Compression;
//! use q4x_parser::decompress::inflate_animation;
//!
//! let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
//! encoder.write_all(b"qpr v1\n").unwrap();
//! let compressed = encoder.finish().unwrap();
//!
//! assert_eq!(inflate_animation(&compressed).unwrap(), b"qpr v1\n");
//! ```

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::debug;

use crate::error::{ParserError, Result};

/// Inflates a zlib-compressed QPR animation block.
///
/// # Errors
///
/// `ParserError::DecompressionError` if the stream is not valid zlib data or
/// ends early. This is reported separately from structural format errors.
pub fn inflate_animation(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| ParserError::DecompressionError {
            reason: e.to_string(),
        })?;

    debug!(
        "inflated animation block: {} -> {} bytes",
        compressed.len(),
        decompressed.len()
    );

    Ok(decompressed)
}
