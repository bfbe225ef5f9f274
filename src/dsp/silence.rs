//! Silence analysis
//!
//! Scans a buffer for runs of sound and returns them as padded frame
//! segments. Only channel 0 is analyzed: multichannel input uses its first
//! channel as the silence proxy.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{db_to_linear, PcmBuffer, Segment};
use crate::error::{ClipsmithError, Result};

/// Padding added around each detected run of sound
pub const DEFAULT_PADDING_SECS: f64 = 0.1;

/// Default level below which audio counts as silence
pub const DEFAULT_THRESHOLD_DB: f32 = -40.0;

/// Silence detection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceParams {
    /// Threshold in dBFS (negative)
    pub threshold_db: f32,
    /// Seconds kept on either side of each run of sound
    pub padding_seconds: f64,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            threshold_db: DEFAULT_THRESHOLD_DB,
            padding_seconds: DEFAULT_PADDING_SECS,
        }
    }
}

impl SilenceParams {
    pub fn new(threshold_db: f32, padding_seconds: f64) -> Self {
        Self {
            threshold_db,
            padding_seconds,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_db.is_finite() || self.threshold_db >= 0.0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: format!(
                    "silence threshold must be a negative dB value, got {}",
                    self.threshold_db
                ),
            });
        }
        if !self.padding_seconds.is_finite() || self.padding_seconds < 0.0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: format!(
                    "silence padding must be non-negative, got {}",
                    self.padding_seconds
                ),
            });
        }
        Ok(())
    }

    /// Padding converted to whole frames at `sample_rate`
    ///
    /// Saturates at `usize::MAX` for paddings longer than any buffer.
    pub fn padding_frames(&self, sample_rate: u32) -> usize {
        (self.padding_seconds * sample_rate as f64).floor() as usize
    }
}

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Silent,
    /// Inside a run of sound that began at this frame
    Sound(usize),
}

/// Find padded runs of sound in `buffer`
///
/// A run opens at the first frame whose magnitude is above the threshold and
/// closes at the first later frame strictly below it; a sample exactly at the
/// threshold keeps the current state. Each closed run is widened by the
/// padding on both sides and clamped to the buffer. A run still open at the
/// end closes at `frame_count`.
///
/// Segments come back in scan order and may overlap once padded; see
/// [`merge_overlapping`](super::compositor::merge_overlapping).
pub fn detect_segments(buffer: &PcmBuffer, params: &SilenceParams) -> Result<Vec<Segment>> {
    params.validate()?;

    if buffer.channel_count() > 1 {
        warn!(
            "Silence detection on {}-channel audio uses channel 0 only",
            buffer.channel_count()
        );
    }

    let linear = db_to_linear(params.threshold_db);
    let frame_count = buffer.frame_count();
    let padding = params.padding_frames(buffer.sample_rate());
    let pad = |start: usize, end: usize| {
        Segment::new(
            start.saturating_sub(padding),
            end.saturating_add(padding).min(frame_count),
        )
    };

    let mut segments = Vec::new();
    let mut state = ScanState::Silent;

    for (frame, &sample) in buffer.channel(0).iter().enumerate() {
        let level = sample.abs();
        state = match state {
            ScanState::Silent if level > linear => ScanState::Sound(frame),
            ScanState::Sound(start) if level < linear => {
                segments.push(pad(start, frame));
                ScanState::Silent
            }
            unchanged => unchanged,
        };
    }

    if let ScanState::Sound(start) = state {
        segments.push(pad(start, frame_count));
    }

    debug!(
        "Silence analysis at {} dB (linear {:.5}, padding {} frames): {} segments",
        params.threshold_db,
        linear,
        padding,
        segments.len()
    );

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mono(samples: Vec<f32>, sample_rate: u32) -> PcmBuffer {
        PcmBuffer::from_channels(vec![samples], sample_rate).unwrap()
    }

    #[test]
    fn test_single_burst_no_padding() {
        let mut samples = vec![0.0; 12];
        samples[4..8].fill(0.5);
        let buffer = PcmBuffer::from_channels(vec![samples.clone(), samples], 44100).unwrap();

        let segments = detect_segments(&buffer, &SilenceParams::new(-20.0, 0.0)).unwrap();
        assert_eq!(segments, vec![Segment::new(4, 8)]);
    }

    #[test]
    fn test_all_silent_yields_nothing() {
        let buffer = mono(vec![0.0; 500], 8000);
        let segments = detect_segments(&buffer, &SilenceParams::new(-90.0, 0.1)).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_open_run_closes_at_end() {
        let buffer = mono(vec![0.0, 0.0, 0.9, 0.9, 0.9], 8000);
        let segments = detect_segments(&buffer, &SilenceParams::new(-20.0, 0.0)).unwrap();
        assert_eq!(segments, vec![Segment::new(2, 5)]);
    }

    #[test]
    fn test_sample_at_threshold_keeps_state() {
        // Samples exactly at the threshold neither open nor close a run
        let linear = db_to_linear(-6.0);
        let buffer = mono(vec![linear, 0.9, linear, linear, 0.0, linear], 8000);

        let segments = detect_segments(&buffer, &SilenceParams::new(-6.0, 0.0)).unwrap();
        assert_eq!(segments, vec![Segment::new(1, 4)]);
    }

    #[test]
    fn test_padding_is_clamped_and_may_overlap() {
        // 10 frames of padding at 100 Hz with padding 0.1s
        let mut samples = vec![0.0; 60];
        samples[5] = 0.8;
        samples[20] = 0.8;
        samples[55] = 0.8;
        let buffer = mono(samples, 100);

        let segments = detect_segments(&buffer, &SilenceParams::new(-20.0, 0.1)).unwrap();
        assert_eq!(
            segments,
            vec![Segment::new(0, 16), Segment::new(10, 31), Segment::new(45, 60)]
        );
    }

    #[test]
    fn test_only_first_channel_analyzed() {
        let buffer = PcmBuffer::from_channels(vec![vec![0.0; 8], vec![1.0; 8]], 8000).unwrap();
        let segments = detect_segments(&buffer, &SilenceParams::new(-20.0, 0.0)).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_negative_samples_count_as_sound() {
        let buffer = mono(vec![0.0, -0.7, -0.7, 0.0], 8000);
        let segments = detect_segments(&buffer, &SilenceParams::new(-20.0, 0.0)).unwrap();
        assert_eq!(segments, vec![Segment::new(1, 3)]);
    }

    #[test]
    fn test_invalid_params() {
        let buffer = mono(vec![0.0; 4], 8000);
        assert!(detect_segments(&buffer, &SilenceParams::new(0.0, 0.1)).is_err());
        assert!(detect_segments(&buffer, &SilenceParams::new(-20.0, -1.0)).is_err());
        assert!(detect_segments(&buffer, &SilenceParams::new(f32::NAN, 0.1)).is_err());
    }

    #[test]
    fn test_padding_longer_than_buffer_covers_everything() {
        let mut samples = vec![0.0; 8];
        samples[3] = 0.9;
        let buffer = mono(samples, 8000);

        let params = SilenceParams::new(-20.0, 1e20);
        assert_eq!(params.padding_frames(8000), usize::MAX);

        let segments = detect_segments(&buffer, &params).unwrap();
        assert_eq!(segments, vec![Segment::new(0, 8)]);
    }
}
