//! Region extraction
//!
//! Slices a frame range out of a buffer into a new buffer.

use log::debug;

use crate::engine::{PcmBuffer, Region};
use crate::error::Result;

/// Copy `region` of every channel into a new buffer
///
/// # Errors
/// * `InvalidRegion` - unless `start_frame < end_frame <= buffer.frame_count()`
pub fn extract_region(buffer: &PcmBuffer, region: Region) -> Result<PcmBuffer> {
    region.validate(buffer.frame_count())?;

    let channels = buffer
        .channels()
        .iter()
        .map(|channel| channel[region.start_frame..region.end_frame].to_vec())
        .collect();

    debug!(
        "Extracted frames [{}, {}) from {}-frame buffer",
        region.start_frame,
        region.end_frame,
        buffer.frame_count()
    );

    PcmBuffer::from_channels(channels, buffer.sample_rate())
}
