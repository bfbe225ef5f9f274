//! Speed change by resampling
//!
//! Plays material faster or slower by reading the source at `speed` frames
//! per output frame. Tempo and pitch move together; the sample rate of the
//! result is unchanged.

use log::debug;

use crate::engine::PcmBuffer;
use crate::error::{ClipsmithError, Result};

/// Slowest speed the toolkit offers
pub const MIN_SPEED: f64 = 0.5;

/// Fastest speed the toolkit offers
pub const MAX_SPEED: f64 = 3.0;

/// Longest channel a speed change will allocate
const MAX_OUTPUT_FRAMES: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Number of output frames for `input_frames` played at `speed`
///
/// # Errors
/// * `InvalidArgument` - if the result is not representable as a channel length
pub fn output_frame_count(input_frames: usize, speed: f64) -> Result<usize> {
    let frames = (input_frames as f64 / speed).ceil();
    if !frames.is_finite() || frames > MAX_OUTPUT_FRAMES as f64 {
        return Err(ClipsmithError::InvalidArgument {
            reason: format!(
                "speed factor {} would stretch {} frames beyond {} frames",
                speed, input_frames, MAX_OUTPUT_FRAMES
            ),
        });
    }
    Ok(frames as usize)
}

/// Resample `buffer` so it plays `speed` times as fast
///
/// Output has `ceil(frames / speed)` frames. Output frame `i` reads the
/// source at position `i * speed`, interpolating linearly between the two
/// neighbouring input frames.
///
/// # Errors
/// * `InvalidArgument` - if `speed` is not a positive finite number, or is
///   so small that the output length cannot be allocated
pub fn change_speed(buffer: &PcmBuffer, speed: f64) -> Result<PcmBuffer> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(ClipsmithError::InvalidArgument {
            reason: format!("speed factor must be positive, got {}", speed),
        });
    }

    if speed == 1.0 {
        return Ok(buffer.clone());
    }

    let target_len = output_frame_count(buffer.frame_count(), speed)?;
    let channels = buffer
        .channels()
        .iter()
        .map(|channel| resample_linear(channel, speed, target_len))
        .collect();

    debug!(
        "Speed x{}: {} -> {} frames",
        speed,
        buffer.frame_count(),
        target_len
    );

    PcmBuffer::from_channels(channels, buffer.sample_rate())
}

/// Linear interpolation resampling
fn resample_linear(samples: &[f32], step: f64, target_len: usize) -> Vec<f32> {
    let source_len = samples.len();
    let last = samples[source_len - 1];

    (0..target_len)
        .map(|i| {
            let src_pos = i as f64 * step;
            let src_idx = src_pos.floor() as usize;
            let frac = (src_pos - src_idx as f64) as f32;

            if src_idx + 1 < source_len {
                samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
            } else {
                // Past the final frame there is nothing to blend toward
                samples.get(src_idx).copied().unwrap_or(last)
            }
        })
        .collect()
}
