//! Builders for synthetic show files used by the integration tests.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Matrix width of every real show.
pub const WIDTH: u16 = 32;

/// Matrix height of every real show.
pub const HEIGHT: u16 = 26;

/// Pixel block size for the real matrix.
pub const BLOCK: usize = WIDTH as usize * HEIGHT as usize * 3;

/// Builds a decompressed QPR stream.
pub struct StreamBuilder {
    data: Vec<u8>,
}

impl StreamBuilder {
    /// Starts a stream with the given header lines.
    pub fn new(name: &str, audio_flag: &str, duration_ms: &str) -> Self {
        let data = format!("qpr v1\n{name}\n{audio_flag}\n{duration_ms}\n").into_bytes();
        Self { data }
    }

    /// Appends a frame with every channel set to `fill`.
    pub fn frame(mut self, fill: u8, duration_ms: u32) -> Self {
        self.data.extend(vec![fill; BLOCK]);
        self.data.extend(duration_ms.to_be_bytes());
        self
    }

    /// Appends a frame with explicit pixel bytes.
    pub fn frame_pixels(mut self, pixels: &[u8], duration_ms: u32) -> Self {
        self.data.extend(pixels);
        self.data.extend(duration_ms.to_be_bytes());
        self
    }

    /// Appends arbitrary trailing bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend(bytes);
        self
    }

    /// Returns the uncompressed stream.
    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Compresses `data` with zlib.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builds an outer Q4X container.
pub struct ContainerBuilder {
    pub magic: [u8; 4],
    pub width: u16,
    pub height: u16,
    pub primary: Vec<u8>,
    pub animation: Vec<u8>,
    pub audio: Vec<u8>,
}

impl ContainerBuilder {
    /// A Q4X1 container with a one-byte primary block around `stream`.
    pub fn new(stream: &[u8]) -> Self {
        Self {
            magic: *b"Q4X1",
            width: WIDTH,
            height: HEIGHT,
            primary: vec![0x00],
            animation: zlib(stream),
            audio: Vec::new(),
        }
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    pub fn dimensions(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn primary(mut self, primary: &[u8]) -> Self {
        self.primary = primary.to_vec();
        self
    }

    pub fn raw_animation(mut self, animation: &[u8]) -> Self {
        self.animation = animation.to_vec();
        self
    }

    pub fn audio(mut self, audio: &[u8]) -> Self {
        self.audio = audio.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = self.magic.to_vec();
        data.extend(self.width.to_be_bytes());
        data.extend(self.height.to_be_bytes());
        data.extend((self.primary.len() as u32).to_be_bytes());
        data.extend(&self.primary);
        data.extend((self.animation.len() as u32).to_be_bytes());
        data.extend(&self.animation);
        data.extend((self.audio.len() as u32).to_be_bytes());
        data.extend(&self.audio);
        data
    }
}

/// The demo show: one black 20 ms frame under a 1000 ms header.
pub fn demo_stream() -> Vec<u8> {
    StreamBuilder::new("Demo", "yes", "1000").frame(0, 20).build()
}
