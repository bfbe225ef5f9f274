//! Segment composition
//!
//! Builds new buffers out of pieces of existing ones: merging padded
//! segments, stitching the kept segments together, and concatenating whole
//! buffers end to end.

use log::{debug, warn};

use crate::engine::{PcmBuffer, Segment};
use crate::error::{ClipsmithError, Result};

/// Fold segments into a minimal ascending, non-overlapping cover
///
/// A segment starting strictly before the current one ends is absorbed into
/// it; segments that merely touch stay separate.
pub fn merge_overlapping(segments: &[Segment]) -> Vec<Segment> {
    let mut sorted = segments.to_vec();
    sorted.sort_by_key(|s| s.start_frame);

    let mut merged: Vec<Segment> = Vec::with_capacity(sorted.len());
    for segment in sorted {
        match merged.last_mut() {
            Some(current) if segment.start_frame < current.end_frame => {
                current.end_frame = current.end_frame.max(segment.end_frame);
            }
            _ => merged.push(segment),
        }
    }

    debug!("Merged {} segments into {}", segments.len(), merged.len());
    merged
}

/// Copy each segment's frames, in order, into one contiguous buffer
///
/// When the segments cover no frames at all the result is a single frame of
/// silence rather than an empty buffer.
///
/// # Errors
/// * `InvalidRegion` - if a segment does not fit inside `buffer`
pub fn compose_from_segments(buffer: &PcmBuffer, segments: &[Segment]) -> Result<PcmBuffer> {
    for segment in segments {
        segment.validate(buffer.frame_count())?;
    }

    let total: usize = segments.iter().map(Segment::len).sum();
    if total == 0 {
        warn!("No frames to compose; producing one frame of silence");
        return PcmBuffer::new(buffer.channel_count(), 1, buffer.sample_rate());
    }

    let mut output = PcmBuffer::new(buffer.channel_count(), total, buffer.sample_rate())?;
    for (ch, channel) in buffer.channels().iter().enumerate() {
        let mut offset = 0;
        for segment in segments {
            let piece = &channel[segment.start_frame..segment.end_frame];
            output.set_channel_data(ch, piece, offset)?;
            offset += piece.len();
        }
    }

    debug!(
        "Composed {} segments: {} -> {} frames",
        segments.len(),
        buffer.frame_count(),
        total
    );

    Ok(output)
}

/// Join buffers end to end
///
/// # Errors
/// * `InvalidArgument` - if `buffers` is empty
/// * `FormatMismatch` - naming the first buffer whose channel count or sample
///   rate differs from the first buffer
pub fn concatenate(buffers: &[PcmBuffer]) -> Result<PcmBuffer> {
    let first = buffers.first().ok_or_else(|| ClipsmithError::InvalidArgument {
        reason: "nothing to concatenate".to_string(),
    })?;

    check_compatible(buffers)?;

    let total: usize = buffers.iter().map(PcmBuffer::frame_count).sum();
    let mut output = PcmBuffer::new(first.channel_count(), total, first.sample_rate())?;

    let mut offset = 0;
    for buffer in buffers {
        for (ch, channel) in buffer.channels().iter().enumerate() {
            output.set_channel_data(ch, channel, offset)?;
        }
        offset += buffer.frame_count();
    }

    debug!(
        "Concatenated {} buffers into {} frames ({})",
        buffers.len(),
        total,
        first.format_label()
    );

    Ok(output)
}

/// Verify every buffer shares the first buffer's channel count and sample rate
pub fn check_compatible(buffers: &[PcmBuffer]) -> Result<()> {
    let Some(first) = buffers.first() else {
        return Ok(());
    };

    match buffers.iter().position(|b| !b.same_format(first)) {
        Some(index) => Err(ClipsmithError::FormatMismatch {
            index,
            expected: first.format_label(),
            found: buffers[index].format_label(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seg(start: usize, end: usize) -> Segment {
        Segment::new(start, end)
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_overlapping(&[seg(0, 16), seg(10, 31), seg(45, 60)]);
        assert_eq!(merged, vec![seg(0, 31), seg(45, 60)]);
    }

    #[test]
    fn test_merge_contained_and_touching() {
        let merged = merge_overlapping(&[seg(0, 20), seg(5, 10), seg(20, 25)]);
        assert_eq!(merged, vec![seg(0, 20), seg(20, 25)]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_overlapping(&[]).is_empty());
    }

    #[test]
    fn test_merge_idempotent() {
        let segments = vec![seg(3, 9), seg(4, 6), seg(8, 14), seg(14, 20), seg(30, 31)];
        let once = merge_overlapping(&segments);
        assert_eq!(merge_overlapping(&once), once);
    }

    #[test]
    fn test_compose_copies_segments_in_order() {
        let left: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let right: Vec<f32> = (0..10).map(|i| -(i as f32)).collect();
        let buffer = PcmBuffer::from_channels(vec![left, right], 8000).unwrap();

        let composed = compose_from_segments(&buffer, &[seg(1, 3), seg(7, 9)]).unwrap();
        assert_eq!(composed.channel(0), &[1.0, 2.0, 7.0, 8.0]);
        assert_eq!(composed.channel(1), &[-1.0, -2.0, -7.0, -8.0]);
        assert_eq!(composed.sample_rate(), 8000);
    }

    #[test]
    fn test_compose_empty_is_one_silent_frame() {
        let buffer = PcmBuffer::from_channels(vec![vec![0.3; 50], vec![0.3; 50]], 8000).unwrap();
        let composed = compose_from_segments(&buffer, &[]).unwrap();

        assert_eq!(composed.frame_count(), 1);
        assert_eq!(composed.channel_count(), 2);
        assert_eq!(composed.channel(0), &[0.0]);
    }

    #[test]
    fn test_compose_rejects_out_of_range_segment() {
        let buffer = PcmBuffer::new(1, 10, 8000).unwrap();
        let result = compose_from_segments(&buffer, &[seg(5, 11)]);
        assert!(matches!(result, Err(ClipsmithError::InvalidRegion { .. })));
    }

    #[test]
    fn test_concatenate_mono() {
        let a = PcmBuffer::from_channels(vec![vec![0.25; 100]], 8000).unwrap();
        let b = PcmBuffer::from_channels(vec![vec![-0.5; 50]], 8000).unwrap();

        let joined = concatenate(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(joined.frame_count(), 150);
        assert_eq!(joined.channel_count(), 1);
        assert_eq!(joined.sample_rate(), 8000);
        assert_eq!(&joined.channel(0)[..100], a.channel(0));
        assert_eq!(&joined.channel(0)[100..], b.channel(0));
    }

    #[test]
    fn test_concatenate_reports_first_mismatch() {
        let a = PcmBuffer::new(2, 10, 44100).unwrap();
        let b = PcmBuffer::new(2, 10, 44100).unwrap();
        let c = PcmBuffer::new(2, 10, 48000).unwrap();
        let d = PcmBuffer::new(1, 10, 44100).unwrap();

        match concatenate(&[a, b, c, d]) {
            Err(ClipsmithError::FormatMismatch { index, found, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(found, "2ch @ 48000Hz");
            }
            other => panic!("Expected FormatMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_concatenate_empty() {
        assert!(matches!(
            concatenate(&[]),
            Err(ClipsmithError::InvalidArgument { .. })
        ));
    }
}
