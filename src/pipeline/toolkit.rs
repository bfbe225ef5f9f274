//! Toolkit pipeline
//!
//! Silence removal -> normalization -> speed change, each stage optional.

use log::info;
use serde::{Deserialize, Serialize};

use crate::codec::encode_wav;
use crate::dsp::{
    change_speed, compose_from_segments, detect_segments, merge_overlapping, normalize_with_gain,
    SilenceParams,
};
use crate::engine::PcmBuffer;
use crate::error::Result;
use crate::progress::ProgressSink;

/// Which toolkit stages run, and how
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolkitOptions {
    pub remove_silence: bool,
    pub silence: SilenceParams,
    pub normalize: bool,
    /// Playback speed factor; 1.0 skips the stage
    pub speed: f64,
}

impl Default for ToolkitOptions {
    fn default() -> Self {
        Self {
            remove_silence: true,
            silence: SilenceParams::default(),
            normalize: true,
            speed: 1.0,
        }
    }
}

/// What each stage did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitReport {
    pub input_frames: usize,
    pub output_frames: usize,
    /// Segments kept by silence removal, if it ran
    pub segments_kept: Option<usize>,
    /// Linear gain applied by normalization, if it ran
    pub gain: Option<f32>,
    pub speed: f64,
}

#[derive(Debug, Clone)]
pub struct ToolkitOutput {
    pub buffer: PcmBuffer,
    pub report: ToolkitReport,
}

/// Drop silent stretches: detect, merge the padded segments, then compose
///
/// Returns the composed buffer and the number of merged segments kept.
pub fn remove_silence(buffer: &PcmBuffer, params: &SilenceParams) -> Result<(PcmBuffer, usize)> {
    let segments = merge_overlapping(&detect_segments(buffer, params)?);
    let composed = compose_from_segments(buffer, &segments)?;
    Ok((composed, segments.len()))
}

/// Run the enabled toolkit stages over `buffer`
pub fn run_toolkit(
    buffer: &PcmBuffer,
    options: &ToolkitOptions,
    progress: &mut dyn ProgressSink,
) -> Result<ToolkitOutput> {
    let mut report = ToolkitReport {
        input_frames: buffer.frame_count(),
        output_frames: buffer.frame_count(),
        segments_kept: None,
        gain: None,
        speed: options.speed,
    };

    let mut current = buffer.clone();

    if options.remove_silence {
        progress.report("silence", 0.0);
        let (trimmed, kept) = remove_silence(&current, &options.silence)?;
        info!(
            "Silence removal: {} -> {} frames ({} segments)",
            current.frame_count(),
            trimmed.frame_count(),
            kept
        );
        current = trimmed;
        report.segments_kept = Some(kept);
        progress.report("silence", 1.0);
    }

    if options.normalize {
        progress.report("normalize", 0.0);
        let normalized = normalize_with_gain(&current);
        info!("Normalize: gain {:.3}", normalized.gain);
        current = normalized.buffer;
        report.gain = Some(normalized.gain);
        progress.report("normalize", 1.0);
    }

    if options.speed != 1.0 {
        progress.report("speed", 0.0);
        let changed = change_speed(&current, options.speed)?;
        info!(
            "Speed x{}: {} -> {} frames",
            options.speed,
            current.frame_count(),
            changed.frame_count()
        );
        current = changed;
        progress.report("speed", 1.0);
    }

    report.output_frames = current.frame_count();
    Ok(ToolkitOutput {
        buffer: current,
        report,
    })
}

/// Run the toolkit and serialize the result as WAV
pub fn run_toolkit_to_wav(
    buffer: &PcmBuffer,
    options: &ToolkitOptions,
    progress: &mut dyn ProgressSink,
) -> Result<(Vec<u8>, ToolkitReport)> {
    let output = run_toolkit(buffer, options, progress)?;
    let bytes = encode_wav(&output.buffer)?;
    Ok((bytes, output.report))
}
