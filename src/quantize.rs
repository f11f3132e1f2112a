//! Duration quantization onto the 50 Hz playback grid.
//!
//! Light show playback advances in 20 ms ticks. Any duration that does not
//! land on a tick is rounded up to the next one. Authoring tools drift a
//! little, so a misaligned value is corrected rather than rejected; each
//! correction is logged at `warn` level and also returned to the caller as
//! a [`DurationCorrection`].
//!
//! ```
//! use q4x_parser::quantize::{quantize, quantize_ms, DurationSource};
//!
//! assert_eq!(quantize_ms(1000), 1000);
//! assert_eq!(quantize_ms(1010), 1020);
//!
//! let frame = quantize(21, DurationSource::Frame(0));
//! assert_eq!(frame.ms, 40);
//! assert_eq!(frame.correction.unwrap().original_ms, 21);
//! ```

use log::warn;
use serde::Serialize;

use crate::format::TICK_MS;

/// Largest duration that lies on the playback grid.
const MAX_ALIGNED_MS: u64 = u64::MAX / TICK_MS * TICK_MS;

/// Snaps a duration up to the next multiple of [`TICK_MS`].
///
/// Aligned values, including zero, are returned unchanged. Values above the
/// last representable tick saturate to it.
#[must_use]
pub fn quantize_ms(ms: u64) -> u64 {
    ms.div_ceil(TICK_MS)
        .checked_mul(TICK_MS)
        .unwrap_or(MAX_ALIGNED_MS)
}

/// Where a duration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    /// The total declared in the animation header.
    Header,
    /// The per-frame duration field of the frame with this index.
    Frame(usize),
}

impl std::fmt::Display for DurationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationSource::Header => f.write_str("animation"),
            DurationSource::Frame(index) => write!(f, "frame {index}"),
        }
    }
}

/// A duration that had to be moved onto the playback grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationCorrection {
    /// Which duration was corrected.
    pub source: DurationSource,
    /// Value as stored in the file.
    pub original_ms: u64,
    /// Value after rounding up.
    pub corrected_ms: u64,
}

impl std::fmt::Display for DurationCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} duration {} ms, new value: {} ms",
            self.source, self.original_ms, self.corrected_ms
        )
    }
}

/// A duration on the playback grid, with the correction that put it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantized {
    /// Aligned duration in milliseconds.
    pub ms: u64,
    /// Present only when the stored value was not aligned.
    pub correction: Option<DurationCorrection>,
}

/// Quantizes `ms` and reports any correction.
#[must_use]
pub fn quantize(ms: u64, source: DurationSource) -> Quantized {
    let aligned = quantize_ms(ms);
    if aligned == ms {
        return Quantized {
            ms: aligned,
            correction: None,
        };
    }

    let correction = DurationCorrection {
        source,
        original_ms: ms,
        corrected_ms: aligned,
    };
    warn!("{correction}");

    Quantized {
        ms: aligned,
        correction: Some(correction),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_aligned_values_unchanged() {
        for ms in [0, 20, 40, 1000, 180_000] {
            let q = quantize(ms, DurationSource::Header);
            assert_eq!(q.ms, ms);
            assert!(q.correction.is_none());
        }
    }

    #[test]
    fn test_header_correction() {
        let q = quantize(1010, DurationSource::Header);
        assert_eq!(q.ms, 1020);
        assert_eq!(
            q.correction,
            Some(DurationCorrection {
                source: DurationSource::Header,
                original_ms: 1010,
                corrected_ms: 1020,
            })
        );
    }

    #[test]
    fn test_frame_correction_rounds_up() {
        assert_eq!(quantize(1, DurationSource::Frame(0)).ms, 20);
        assert_eq!(quantize(21, DurationSource::Frame(4)).ms, 40);
        assert_eq!(quantize(39, DurationSource::Frame(4)).ms, 40);
    }

    #[test]
    fn test_beyond_u32_range() {
        assert_eq!(quantize_ms(u64::from(u32::MAX)), 4_294_967_300);
        assert_eq!(quantize_ms(5_000_000_000), 5_000_000_000);
        assert_eq!(quantize_ms(5_000_000_001), 5_000_000_020);
    }

    #[test]
    fn test_saturates_at_last_tick() {
        assert_eq!(quantize_ms(u64::MAX), MAX_ALIGNED_MS);
        assert_eq!(quantize_ms(MAX_ALIGNED_MS), MAX_ALIGNED_MS);
        assert_eq!(MAX_ALIGNED_MS % TICK_MS, 0);
    }

    #[test]
    fn test_correction_display() {
        let q = quantize(21, DurationSource::Frame(7));
        assert_eq!(
            q.correction.unwrap().to_string(),
            "invalid frame 7 duration 21 ms, new value: 40 ms"
        );
    }

    proptest! {
        #[test]
        fn prop_quantize_is_ceiling_to_tick(ms in 0..=MAX_ALIGNED_MS) {
            let q = quantize_ms(ms);
            prop_assert_eq!(q % TICK_MS, 0);
            prop_assert!(q >= ms);
            prop_assert!(q - ms < TICK_MS);
        }

        #[test]
        fn prop_quantize_is_idempotent(ms in any::<u64>()) {
            let once = quantize_ms(ms);
            prop_assert_eq!(quantize_ms(once), once);
        }

        #[test]
        fn prop_correction_only_when_misaligned(ms in any::<u32>()) {
            let q = quantize(u64::from(ms), DurationSource::Frame(0));
            prop_assert_eq!(q.correction.is_some(), u64::from(ms) % TICK_MS != 0);
        }
    }
}
