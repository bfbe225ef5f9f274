//! PCM Buffer Model
//!
//! Provides the core multichannel buffer type shared by every transformation,
//! along with frame ranges and level helpers.
//!
//! Buffers are values: every transformation builds a new `PcmBuffer` and
//! never touches its input, so independent buffers can be processed from
//! different threads without synchronization.

use serde::{Deserialize, Serialize};

use crate::error::{ClipsmithError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (0.0 to 1.0+ range)
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns `f32::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Frame Ranges
// ============================================================================

/// Half-open frame range `[start_frame, end_frame)` within a source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start_frame: usize,
    pub end_frame: usize,
}

/// A frame range classified as non-silent by silence analysis.
pub type Segment = Region;

impl Region {
    pub fn new(start_frame: usize, end_frame: usize) -> Self {
        Self {
            start_frame,
            end_frame,
        }
    }

    /// Build a region from a time range using `frame = floor(t * sample_rate)`
    ///
    /// Only the times themselves are checked here; whether the range fits a
    /// particular buffer is decided by the extractor.
    pub fn from_seconds(start_secs: f64, end_secs: f64, sample_rate: u32) -> Result<Self> {
        for (name, t) in [("start", start_secs), ("end", end_secs)] {
            if !t.is_finite() || t < 0.0 {
                return Err(ClipsmithError::InvalidArgument {
                    reason: format!("{} time must be a non-negative number, got {}", name, t),
                });
            }
        }

        let rate = sample_rate as f64;
        Ok(Self {
            start_frame: (start_secs * rate).floor() as usize,
            end_frame: (end_secs * rate).floor() as usize,
        })
    }

    /// Number of frames covered
    #[inline]
    pub fn len(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check `start_frame < end_frame <= frame_count`
    pub fn validate(&self, frame_count: usize) -> Result<()> {
        if self.start_frame >= self.end_frame || self.end_frame > frame_count {
            return Err(ClipsmithError::InvalidRegion {
                start: self.start_frame,
                end: self.end_frame,
                frame_count,
            });
        }
        Ok(())
    }
}

// ============================================================================
// PCM Buffer
// ============================================================================

/// Non-interleaved floating point audio
///
/// Samples nominally lie in [-1.0, 1.0] but may exceed it until they are
/// quantized by a serializer.
///
/// # Invariants
/// - at least one channel
/// - every channel holds exactly `frame_count()` samples, and that is at least 1
/// - `sample_rate > 0`
///
/// # Example
/// ```
/// use clipsmith::engine::PcmBuffer;
///
/// // One second of stereo silence
/// let buffer = PcmBuffer::new(2, 44100, 44100).unwrap();
/// assert_eq!(buffer.channel_count(), 2);
/// assert_eq!(buffer.frame_count(), 44100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Create a zero-initialized buffer
    ///
    /// # Errors
    /// * `InvalidArgument` - if any of the three dimensions is zero
    pub fn new(channel_count: usize, frame_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count < 1 {
            return Err(ClipsmithError::InvalidArgument {
                reason: "buffer needs at least one channel".to_string(),
            });
        }
        if frame_count < 1 {
            return Err(ClipsmithError::InvalidArgument {
                reason: "buffer needs at least one frame".to_string(),
            });
        }
        if sample_rate == 0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: "sample rate must be positive".to_string(),
            });
        }

        Ok(Self {
            channels: vec![vec![0.0_f32; frame_count]; channel_count],
            sample_rate,
        })
    }

    /// Wrap existing per-channel sample vectors
    ///
    /// # Errors
    /// * `InvalidArgument` - if there are no channels, the channels are empty
    ///   or of unequal length, or the sample rate is zero
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        let frame_count = match channels.first() {
            Some(first) => first.len(),
            None => {
                return Err(ClipsmithError::InvalidArgument {
                    reason: "buffer needs at least one channel".to_string(),
                })
            }
        };

        if frame_count == 0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: "buffer needs at least one frame".to_string(),
            });
        }

        if let Some((index, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frame_count)
        {
            return Err(ClipsmithError::InvalidArgument {
                reason: format!(
                    "channel {} has {} frames, expected {}",
                    index,
                    ch.len(),
                    frame_count
                ),
            });
        }

        if sample_rate == 0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: "sample rate must be positive".to_string(),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create an audio buffer from interleaved sample data
    pub fn from_interleaved(
        interleaved: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self> {
        if channel_count == 0 || interleaved.len() % channel_count != 0 {
            return Err(ClipsmithError::InvalidArgument {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    channel_count
                ),
            });
        }

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }

        Self::from_channels(channels, sample_rate)
    }

    /// Copy `source` into channel `channel_index` starting at `dest_offset`
    ///
    /// # Errors
    /// * `OutOfBounds` - if the channel does not exist or the write would run
    ///   past `frame_count()`
    pub fn set_channel_data(
        &mut self,
        channel_index: usize,
        source: &[f32],
        dest_offset: usize,
    ) -> Result<()> {
        let frame_count = self.frame_count();
        let channel_count = self.channel_count();

        let channel = self
            .channels
            .get_mut(channel_index)
            .ok_or_else(|| ClipsmithError::OutOfBounds {
                reason: format!(
                    "channel {} does not exist ({} channels)",
                    channel_index, channel_count
                ),
            })?;

        let end = dest_offset
            .checked_add(source.len())
            .filter(|&end| end <= frame_count)
            .ok_or_else(|| ClipsmithError::OutOfBounds {
                reason: format!(
                    "writing {} samples at offset {} exceeds {} frames",
                    source.len(),
                    dest_offset,
                    frame_count
                ),
            })?;

        channel[dest_offset..end].copy_from_slice(source);
        Ok(())
    }

    /// Get the number of channels
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// All channels, in order
    #[inline]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Samples of one channel
    ///
    /// # Panics
    /// Panics if `index >= channel_count()`.
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Consume the buffer, handing back its channel vectors
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Convert the buffer to interleaved format (frame-major, channel-minor)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.channel_count() * self.frame_count());
        for frame in 0..self.frame_count() {
            for channel in &self.channels {
                interleaved.push(channel[frame]);
            }
        }
        interleaved
    }

    /// New buffer of the same shape with `f` applied to every sample
    pub fn map_samples<F>(&self, f: F) -> PcmBuffer
    where
        F: Fn(f32) -> f32,
    {
        PcmBuffer {
            channels: self
                .channels
                .iter()
                .map(|channel| channel.iter().map(|&s| f(s)).collect())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Check two buffers can be combined sample-for-sample
    pub fn same_format(&self, other: &PcmBuffer) -> bool {
        self.channel_count() == other.channel_count() && self.sample_rate == other.sample_rate
    }

    /// Short human-readable format description, e.g. `2ch @ 44100Hz`
    pub fn format_label(&self) -> String {
        format!("{}ch @ {}Hz", self.channel_count(), self.sample_rate)
    }

    /// Maximum absolute sample value over all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// Peak level in dBFS
    pub fn peak_db(&self) -> f32 {
        linear_to_db(self.peak())
    }

    /// RMS level over all channels in dBFS
    pub fn rms_db(&self) -> f32 {
        let total_samples = self.channel_count() * self.frame_count();
        let sum_squares: f64 = self
            .channels
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();

        let rms = (sum_squares / total_samples as f64).sqrt() as f32;
        linear_to_db(rms)
    }
}

// ============================================================================
// Tests
// ============================================================================
