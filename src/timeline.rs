//! Timeline assembly: turning decoded frames into a bounded show.
//!
//! The header's declared duration and the sum of the frame durations are two
//! independent estimates of the show length, and they may disagree (frames
//! can be cut off, captures can be padded). The assembler reconciles them:
//!
//! 1. `header = min(declared, cap)`
//! 2. frames are consumed until their running sum exceeds `cap`; the frame
//!    that crosses the cap is kept, nothing after it is read
//! 3. `output = max(header, min(sum, cap))`
//!
//! The cap defaults to three minutes. All arithmetic is done in whole
//! milliseconds; seconds are only derived for reporting.

use log::info;
use serde::Serialize;

use crate::animation::{AnimationHeader, DecodedFrame, Frame, FrameDecoder};
use crate::config::DecoderConfig;
use crate::error::Result;
use crate::format::MAX_DURATION_MS;
use crate::quantize::DurationCorrection;

/// Converts whole milliseconds to seconds.
#[must_use]
pub fn ms_to_secs(ms: u64) -> f64 {
    // Show durations stay far below 2^53 ms
    ms as f64 / 1000.0
}

/// A frame and how long it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// The pixel snapshot.
    pub frame: Frame,
    /// Display duration in milliseconds, on the 20 ms grid.
    pub duration_ms: u64,
}

impl TimelineEntry {
    /// Display duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        ms_to_secs(self.duration_ms)
    }
}

/// The assembled, immutable show timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    header_duration_ms: u64,
    frame_duration_sum_ms: u64,
    output_duration_ms: u64,
    stopped_at_cap: bool,
    corrections: Vec<DurationCorrection>,
}

impl Timeline {
    /// Frames in display order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Consumes the timeline, returning its frames.
    #[must_use]
    pub fn into_entries(self) -> Vec<TimelineEntry> {
        self.entries
    }

    /// Number of frames kept.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    /// Header duration after the cap was applied.
    #[must_use]
    pub fn header_duration_ms(&self) -> u64 {
        self.header_duration_ms
    }

    /// Sum of the kept frame durations. May exceed the cap by at most the
    /// last frame's duration.
    #[must_use]
    pub fn frame_duration_sum_ms(&self) -> u64 {
        self.frame_duration_sum_ms
    }

    /// Final length of the output video.
    #[must_use]
    pub fn output_duration_ms(&self) -> u64 {
        self.output_duration_ms
    }

    /// [`Timeline::header_duration_ms`] in seconds.
    #[must_use]
    pub fn header_duration_secs(&self) -> f64 {
        ms_to_secs(self.header_duration_ms)
    }

    /// [`Timeline::frame_duration_sum_ms`] in seconds.
    #[must_use]
    pub fn frame_duration_sum_secs(&self) -> f64 {
        ms_to_secs(self.frame_duration_sum_ms)
    }

    /// [`Timeline::output_duration_ms`] in seconds.
    #[must_use]
    pub fn output_duration_secs(&self) -> f64 {
        ms_to_secs(self.output_duration_ms)
    }

    /// Whether decoding ended because the frame sum passed the cap.
    #[must_use]
    pub fn stopped_at_cap(&self) -> bool {
        self.stopped_at_cap
    }

    /// Every duration correction made for the header and the kept frames.
    #[must_use]
    pub fn corrections(&self) -> &[DurationCorrection] {
        &self.corrections
    }

    /// Per-frame display durations in seconds, in order.
    #[must_use]
    pub fn durations_secs(&self) -> Vec<f64> {
        self.entries.iter().map(TimelineEntry::duration_secs).collect()
    }

    /// Reporting view of the timeline.
    #[must_use]
    pub fn summary(&self) -> TimelineSummary {
        TimelineSummary {
            frame_count: self.frame_count(),
            header_duration_secs: self.header_duration_secs(),
            frame_duration_sum_secs: self.frame_duration_sum_secs(),
            output_duration_secs: self.output_duration_secs(),
            output_duration_mins: self.output_duration_secs() / 60.0,
            stopped_at_cap: self.stopped_at_cap,
            corrections: self.corrections.len(),
        }
    }
}

/// Scalar facts about a timeline, for logs and CLI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
    /// Number of frames kept.
    pub frame_count: usize,
    /// Capped header duration.
    pub header_duration_secs: f64,
    /// Sum of the kept frame durations.
    pub frame_duration_sum_secs: f64,
    /// Final output length.
    pub output_duration_secs: f64,
    /// Final output length in minutes.
    pub output_duration_mins: f64,
    /// Whether the runtime cap ended decoding.
    pub stopped_at_cap: bool,
    /// Number of durations moved onto the grid.
    pub corrections: usize,
}

/// Builds a [`Timeline`] from a header and a frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineAssembler {
    max_duration_ms: u64,
}

impl Default for TimelineAssembler {
    fn default() -> Self {
        Self::new(MAX_DURATION_MS)
    }
}

impl TimelineAssembler {
    /// Creates an assembler with the given runtime cap.
    #[must_use]
    pub fn new(max_duration_ms: u64) -> Self {
        Self { max_duration_ms }
    }

    /// Creates an assembler using the configured runtime cap.
    #[must_use]
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.max_duration_ms)
    }

    /// The runtime cap in milliseconds.
    #[must_use]
    pub fn max_duration_ms(&self) -> u64 {
        self.max_duration_ms
    }

    /// Consumes frames from `decoder` and reconciles their timing with the
    /// header.
    ///
    /// Decoding stops, without error, at the first frame that pushes the
    /// running sum past the cap.
    ///
    /// # Errors
    ///
    /// Any error yielded by the decoder (a truncated record) aborts assembly.
    pub fn assemble(&self, header: &AnimationHeader, decoder: FrameDecoder<'_>) -> Result<Timeline> {
        let cap = self.max_duration_ms;
        let header_duration_ms = header.declared_duration_ms.min(cap);

        let mut running_ms = 0u64;
        let decoder = decoder.stop_after(move |frame: &DecodedFrame| {
            running_ms += frame.duration_ms;
            running_ms > cap
        });

        let mut entries = Vec::new();
        let mut corrections: Vec<DurationCorrection> = header.correction.into_iter().collect();
        let mut frame_duration_sum_ms = 0u64;

        for decoded in decoder {
            let decoded = decoded?;
            frame_duration_sum_ms += decoded.duration_ms;
            corrections.extend(decoded.correction);
            entries.push(TimelineEntry {
                frame: decoded.frame,
                duration_ms: decoded.duration_ms,
            });
        }

        let stopped_at_cap = frame_duration_sum_ms > cap;
        let output_duration_ms = header_duration_ms.max(frame_duration_sum_ms.min(cap));

        let timeline = Timeline {
            entries,
            header_duration_ms,
            frame_duration_sum_ms,
            output_duration_ms,
            stopped_at_cap,
            corrections,
        };

        let summary = timeline.summary();
        info!(
            "frame count: {}, frame duration sum: {} s, video duration: {} s ({:.2} m)",
            summary.frame_count,
            summary.frame_duration_sum_secs,
            summary.output_duration_secs,
            summary.output_duration_mins
        );

        Ok(timeline)
    }
}
