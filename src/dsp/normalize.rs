//! Peak normalization
//!
//! Boosts quiet material so its loudest sample reaches full scale. Material
//! that is silent or already at or above full scale is passed through.

use log::debug;

use crate::engine::PcmBuffer;

/// Outcome of a normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub buffer: PcmBuffer,
    /// Linear gain applied (1.0 when the input was passed through)
    pub gain: f32,
}

/// Scale `buffer` so its peak magnitude becomes exactly 1.0
///
/// Samples are divided by the peak in double precision, so the loudest
/// sample lands on ±1.0 and normalizing twice changes nothing.
pub fn normalize(buffer: &PcmBuffer) -> PcmBuffer {
    normalize_with_gain(buffer).buffer
}

/// Same as [`normalize`], also reporting the gain
pub fn normalize_with_gain(buffer: &PcmBuffer) -> Normalized {
    let peak = buffer.peak();

    if peak == 0.0 || peak >= 1.0 || !peak.is_finite() {
        debug!("Normalize skipped (peak {})", peak);
        return Normalized {
            buffer: buffer.clone(),
            gain: 1.0,
        };
    }

    let peak = peak as f64;
    let gain = (1.0 / peak) as f32;
    debug!("Normalize: peak {:.5}, gain {:.3}", peak, gain);

    Normalized {
        buffer: buffer.map_samples(|s| (s as f64 / peak) as f32),
        gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn buffer(channels: Vec<Vec<f32>>) -> PcmBuffer {
        PcmBuffer::from_channels(channels, 44100).unwrap()
    }

    #[test]
    fn test_normalize_boosts_to_full_scale() {
        let input = buffer(vec![vec![0.1, -0.25, 0.05], vec![0.2, 0.0, -0.1]]);
        let result = normalize_with_gain(&input);

        assert_relative_eq!(result.gain, 4.0, epsilon = 1e-6);
        assert_eq!(result.buffer.peak(), 1.0);
        assert_eq!(result.buffer.channel(0)[1], -1.0);
        assert_relative_eq!(result.buffer.channel(1)[0], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_silent_passthrough() {
        let input = PcmBuffer::new(2, 100, 44100).unwrap();
        let result = normalize_with_gain(&input);
        assert_eq!(result.buffer, input);
        assert_eq!(result.gain, 1.0);
    }

    #[test]
    fn test_normalize_never_attenuates() {
        let input = buffer(vec![vec![0.5, 1.5, -0.2]]);
        assert_eq!(normalize(&input), input);

        let full = buffer(vec![vec![1.0, -0.3]]);
        assert_eq!(normalize(&full), full);
    }

    #[test]
    fn test_normalize_idempotent() {
        let input = buffer(vec![vec![0.013, -0.37, 0.29, 0.0001], vec![0.3, 0.1, -0.2, 0.33]]);
        let once = normalize(&input);
        let twice = normalize(&once);
        assert_eq!(twice, once);
    }
}
