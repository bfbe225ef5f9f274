//! Merge pipeline
//!
//! Validates that every input shares one format, then joins them in order.

use log::info;

use crate::codec::encode_wav;
use crate::dsp::{check_compatible, concatenate};
use crate::engine::PcmBuffer;
use crate::error::Result;
use crate::progress::ProgressSink;

/// Concatenate `buffers` after checking they share channel count and sample rate
pub fn merge_buffers(buffers: &[PcmBuffer], progress: &mut dyn ProgressSink) -> Result<PcmBuffer> {
    progress.report("validate", 0.0);
    check_compatible(buffers)?;
    progress.report("validate", 1.0);

    progress.report("concatenate", 0.0);
    let merged = concatenate(buffers)?;
    progress.report("concatenate", 1.0);

    info!(
        "Merged {} inputs into {} frames ({:.2}s)",
        buffers.len(),
        merged.frame_count(),
        merged.duration_secs()
    );
    Ok(merged)
}

/// Merge and serialize as WAV
pub fn merge_to_wav(buffers: &[PcmBuffer], progress: &mut dyn ProgressSink) -> Result<Vec<u8>> {
    let merged = merge_buffers(buffers, progress)?;
    encode_wav(&merged)
}
