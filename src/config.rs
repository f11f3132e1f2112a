//! Decoder configuration.
//!
//! The defaults describe the only matrix the show format is produced for
//! (32 × 26 window pixels) and the three-minute runtime cap. A JSON file can
//! override them; any field left out keeps its default.
//!
//! ```
//! use q4x_parser::config::DecoderConfig;
//!
//! let config = DecoderConfig::from_json_str(r#"{ "max_duration_ms": 60000 }"#).unwrap();
//! assert_eq!(config.matrix_width, 32);
//! assert_eq!(config.max_duration_ms, 60_000);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParserError, Result};
use crate::format::{pixel_block_size, MATRIX_HEIGHT, MATRIX_WIDTH, MAX_DURATION_MS, TICK_MS};

/// Settings shared by every decoding stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Matrix width the container must declare.
    pub matrix_width: u16,
    /// Matrix height the container must declare.
    pub matrix_height: u16,
    /// Runtime cap applied to both the header duration and the frame sum.
    pub max_duration_ms: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            matrix_width: MATRIX_WIDTH,
            matrix_height: MATRIX_HEIGHT,
            max_duration_ms: MAX_DURATION_MS,
        }
    }
}

impl DecoderConfig {
    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// `ParserError::InvalidConfig` if the JSON is malformed or a value fails
    /// [`DecoderConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ParserError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `ParserError::IoError` if the file cannot be read, otherwise as
    /// [`DecoderConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that the configuration can describe a decodable show.
    ///
    /// # Errors
    ///
    /// `ParserError::InvalidConfig` for a zero dimension, or a cap that is
    /// zero or not a whole number of playback ticks.
    pub fn validate(&self) -> Result<()> {
        if self.matrix_width == 0 || self.matrix_height == 0 {
            return Err(ParserError::InvalidConfig {
                reason: format!(
                    "matrix must be nonzero, got {}x{}",
                    self.matrix_width, self.matrix_height
                ),
            });
        }

        if self.max_duration_ms == 0 || self.max_duration_ms % TICK_MS != 0 {
            return Err(ParserError::InvalidConfig {
                reason: format!(
                    "max_duration_ms must be a positive multiple of {TICK_MS}, got {}",
                    self.max_duration_ms
                ),
            });
        }

        Ok(())
    }

    /// Byte length of one pixel block for the configured matrix.
    #[must_use]
    pub fn pixel_block_size(&self) -> usize {
        pixel_block_size(self.matrix_width, self.matrix_height)
    }
}
