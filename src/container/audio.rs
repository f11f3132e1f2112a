//! Embedded soundtrack handling.
//!
//! The external composer reads audio from a file path, so the payload is
//! written to a named temporary file. [`ExtractedAudio`] owns that file and
//! deletes it when dropped, on success and failure paths alike.

use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::format::AudioFormat;

/// Prefix for temporary soundtrack files.
const TEMP_PREFIX: &str = "q4x-sound-";

/// Raw soundtrack bytes taken from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Sniffed container format of the payload.
    pub format: AudioFormat,
    /// The payload exactly as stored.
    pub data: Vec<u8>,
}

impl AudioPayload {
    /// Wraps payload bytes, sniffing their format.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            format: AudioFormat::sniff(&data),
            data,
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty. Containers never produce empty payloads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the payload to a temporary file in the system temp directory.
    ///
    /// # Errors
    ///
    /// `ParserError::IoError` if the file cannot be created or written.
    pub fn persist(&self) -> Result<ExtractedAudio> {
        self.persist_in(std::env::temp_dir())
    }

    /// Writes the payload to a temporary file inside `dir`.
    ///
    /// The file name ends in `.ogg` or `.mp3` to match the sniffed format.
    ///
    /// # Errors
    ///
    /// `ParserError::IoError` if the file cannot be created or written.
    pub fn persist_in(&self, dir: impl AsRef<Path>) -> Result<ExtractedAudio> {
        let suffix = format!(".{}", self.format.extension());
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)?;

        file.write_all(&self.data)?;
        file.flush()?;

        debug!(
            "wrote {} bytes of {:?} audio to {}",
            self.data.len(),
            self.format,
            file.path().display()
        );

        Ok(ExtractedAudio {
            format: self.format,
            file,
        })
    }
}

/// A soundtrack persisted to disk for the composer.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ExtractedAudio {
    format: AudioFormat,
    file: NamedTempFile,
}

impl ExtractedAudio {
    /// Location of the temporary audio file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Sniffed format of the audio.
    #[must_use]
    pub fn format(&self) -> AudioFormat {
        self.format
    }
}
