//! Pixel frame records and the lazy frame decoder.
//!
//! After the header, a QPR stream is a run of fixed-size records:
//!
//! | Offset | Size | Type | Field |
//! |--------|------|------|-------|
//! | 0 | `width * height * 3` | u8 RGB | Pixel block, row-major |
//! | `width * height * 3` | 4 | u32 BE | Display duration (milliseconds) |
//!
//! The stream ends cleanly when no bytes are left at a record boundary.
//! Anything shorter than a full record is an error.
//!
//! # Example
//!
//! ```
//! use q4x_parser::animation::FrameDecoder;
//!
//! let mut data = vec![255u8; 2 * 2 * 3];
//! data.extend(40u32.to_be_bytes());
//!
//! let frames: Vec<_> = FrameDecoder::new(&data, 2, 2).collect::<Result<_, _>>()?;
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].duration_ms, 40);
//! assert_eq!(frames[0].frame.color(1, 1), [1.0, 1.0, 1.0]);
//! # Ok::<(), q4x_parser::error::ParserError>(())
//! ```

use std::iter::FusedIterator;

use log::debug;

use crate::binary::{read_u32_be, remaining};
use crate::error::{ParserError, Result};
use crate::format::{pixel_block_size, CHANNELS, FRAME_DURATION_SIZE};
use crate::quantize::{quantize, DurationCorrection, DurationSource};

/// One full snapshot of the pixel matrix.
///
/// Cells are stored row-major as raw 8-bit RGB triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wraps a pixel block. Returns `None` if its length does not match the matrix.
    #[must_use]
    pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == pixel_block_size(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Matrix width in cells.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Matrix height in cells.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The raw pixel block.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Raw channel values of the cell at `row`, `col`.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the matrix.
    #[must_use]
    pub fn rgb(&self, row: u16, col: u16) -> [u8; 3] {
        assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}x{} matrix",
            self.width,
            self.height
        );
        let start = (usize::from(row) * usize::from(self.width) + usize::from(col)) * CHANNELS;
        [self.pixels[start], self.pixels[start + 1], self.pixels[start + 2]]
    }

    /// Channel values of the cell at `row`, `col`, scaled to `0.0..=1.0`.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the matrix.
    #[must_use]
    pub fn color(&self, row: u16, col: u16) -> [f32; 3] {
        self.rgb(row, col).map(normalize)
    }

    /// Iterates over every cell, row index outer and column index inner.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = usize::from(self.width);
        self.pixels
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, rgb)| Cell {
                // Both quotient and remainder are bounded by the u16 dimensions
                row: (i / width) as u16,
                col: (i % width) as u16,
                color: [normalize(rgb[0]), normalize(rgb[1]), normalize(rgb[2])],
            })
    }
}

/// A single matrix cell with its normalized color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Row index, 0 at the top.
    pub row: u16,
    /// Column index, 0 at the left.
    pub col: u16,
    /// Red, green and blue in `0.0..=1.0`.
    pub color: [f32; 3],
}

fn normalize(channel: u8) -> f32 {
    f32::from(channel) / 255.0
}

/// A frame together with its quantized display duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Zero-based position in the stream.
    pub index: usize,
    /// The pixel snapshot.
    pub frame: Frame,
    /// Duration field as stored.
    pub raw_duration_ms: u32,
    /// Duration after quantization.
    pub duration_ms: u64,
    /// Set when the stored duration was off-grid.
    pub correction: Option<DurationCorrection>,
}

/// Early-stop predicate type used when none is supplied.
pub type NeverStop = fn(&DecodedFrame) -> bool;

/// Lazy, forward-only decoder over the frame records of a QPR stream.
///
/// Each call to `next` reads exactly one record. An optional stop predicate
/// sees every decoded frame; when it returns `true` that frame is still
/// yielded and decoding ends there without consuming further bytes. After
/// an error the decoder yields nothing more.
pub struct FrameDecoder<'a, P = NeverStop> {
    data: &'a [u8],
    offset: usize,
    width: u16,
    height: u16,
    block_size: usize,
    index: usize,
    finished: bool,
    stop: Option<P>,
}

impl<'a> FrameDecoder<'a> {
    /// Creates a decoder over `data`, which must start at a record boundary.
    #[must_use]
    pub fn new(data: &'a [u8], width: u16, height: u16) -> Self {
        FrameDecoder {
            data,
            offset: 0,
            width,
            height,
            block_size: pixel_block_size(width, height),
            index: 0,
            finished: false,
            stop: None,
        }
    }
}

impl<'a, P> FrameDecoder<'a, P>
where
    P: FnMut(&DecodedFrame) -> bool,
{
    /// Installs an early-stop predicate, replacing any previous one.
    #[must_use]
    pub fn stop_after<Q>(self, predicate: Q) -> FrameDecoder<'a, Q>
    where
        Q: FnMut(&DecodedFrame) -> bool,
    {
        FrameDecoder {
            data: self.data,
            offset: self.offset,
            width: self.width,
            height: self.height,
            block_size: self.block_size,
            index: self.index,
            finished: self.finished,
            stop: Some(predicate),
        }
    }

    /// Number of frames yielded so far.
    #[must_use]
    pub fn frames_decoded(&self) -> usize {
        self.index
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn bytes_remaining(&self) -> usize {
        remaining(self.data, self.offset)
    }

    /// Size of one record: pixel block plus duration field.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.block_size + FRAME_DURATION_SIZE
    }

    /// How many complete records the whole input holds.
    #[must_use]
    pub fn expected_frame_count(&self) -> usize {
        self.data.len() / self.record_size()
    }

    /// Whether the decoder has ended, by exhaustion, error, or early stop.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn decode_record(&mut self) -> Result<DecodedFrame> {
        let available = self.bytes_remaining();
        if available < self.block_size {
            return Err(ParserError::TruncatedFrame {
                index: self.index,
                expected: self.block_size,
                available,
            });
        }

        let pixels = self.data[self.offset..self.offset + self.block_size].to_vec();
        self.offset += self.block_size;

        let raw_duration_ms =
            read_u32_be(self.data, self.offset).map_err(|_| ParserError::TruncatedFrame {
                index: self.index,
                expected: FRAME_DURATION_SIZE,
                available: self.bytes_remaining(),
            })?;
        self.offset += FRAME_DURATION_SIZE;

        let quantized = quantize(u64::from(raw_duration_ms), DurationSource::Frame(self.index));
        let decoded = DecodedFrame {
            index: self.index,
            frame: Frame {
                width: self.width,
                height: self.height,
                pixels,
            },
            raw_duration_ms,
            duration_ms: quantized.ms,
            correction: quantized.correction,
        };
        self.index += 1;

        Ok(decoded)
    }
}

impl<P> Iterator for FrameDecoder<'_, P>
where
    P: FnMut(&DecodedFrame) -> bool,
{
    type Item = Result<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.bytes_remaining() == 0 {
            self.finished = true;
            return None;
        }

        match self.decode_record() {
            Ok(decoded) => {
                if self.stop.as_mut().is_some_and(|stop| stop(&decoded)) {
                    debug!(
                        "frame decoding stopped after frame {} with {} bytes unread",
                        decoded.index,
                        self.bytes_remaining()
                    );
                    self.finished = true;
                }
                Some(Ok(decoded))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        (0, Some(self.bytes_remaining().div_ceil(self.record_size())))
    }
}

impl<P> FusedIterator for FrameDecoder<'_, P> where P: FnMut(&DecodedFrame) -> bool {}
