//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::cli::EncodeArgs;
use crate::codec::{encode, BlockEncoder, EncodingRequest, LameEncoder};
use crate::config::Settings;
use crate::dsp::extract_region;
use crate::engine::{load_audio, write_output, PcmBuffer, Region};
use crate::error::{ClipsmithError, Result};
use crate::pipeline::{export_clips, merge_buffers, run_toolkit};
use crate::progress::{NoProgress, ProgressSink};

/// Logs stage progress at quarter steps
struct LogProgress {
    last: Option<(String, u32)>,
}

impl LogProgress {
    fn new() -> Self {
        Self { last: None }
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, stage: &str, fraction: f32) {
        let quarter = (fraction.clamp(0.0, 1.0) * 4.0).floor() as u32;
        let current = Some((stage.to_string(), quarter));
        if current != self.last {
            debug!("{}: {:.0}%", stage, fraction * 100.0);
            self.last = current;
        }
    }
}

/// Encode `buffer` as requested, starting an MP3 encoder only when needed
fn encode_with(
    buffer: &PcmBuffer,
    request: EncodingRequest,
    settings: &Settings,
) -> Result<Vec<u8>> {
    let mut progress = LogProgress::new();
    match request {
        EncodingRequest::Wav => encode(buffer, request, None, &mut progress),
        EncodingRequest::Mp3 { .. } => {
            let mut lame = LameEncoder::new(&settings.encoder.lame_path);
            let encoder: &mut dyn BlockEncoder = &mut lame;
            encode(buffer, request, Some(encoder), &mut progress)
        }
    }
}

/// Parse `START-END` in seconds, e.g. `1.5-3`
pub fn parse_range(text: &str) -> Result<(f64, f64)> {
    let invalid = || ClipsmithError::InvalidArgument {
        reason: format!("range '{}' is not START-END in seconds", text),
    };

    let (start, end) = text.split_once('-').ok_or_else(invalid)?;
    let start: f64 = start.trim().parse().map_err(|_| invalid())?;
    let end: f64 = end.trim().parse().map_err(|_| invalid())?;
    Ok((start, end))
}

/// Collect `.wav` files under `dir`, sorted by path
pub fn collect_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ClipsmithError::FileNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Print format, length and levels of a file.
pub fn info(input: &Path) -> Result<()> {
    let buffer = load_audio(input)?;

    println!("File: {}", input.display());
    println!("Channels: {}", buffer.channel_count());
    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Frames: {}", buffer.frame_count());
    println!("Duration: {:.3}s", buffer.duration_secs());
    println!("Peak: {:.1} dBFS", buffer.peak_db());
    println!("RMS: {:.1} dBFS", buffer.rms_db());

    Ok(())
}

/// Cut one time range into a new file.
pub fn clip(
    settings: &Settings,
    input: &Path,
    start: f64,
    end: f64,
    output: &Path,
    encode_args: &EncodeArgs,
) -> Result<()> {
    let request = encode_args.request(settings)?;
    let buffer = load_audio(input)?;

    let region = Region::from_seconds(start, end, buffer.sample_rate())?;
    info!(
        "Clipping {:.3}s-{:.3}s (frames {}-{})",
        start, end, region.start_frame, region.end_frame
    );

    let clip = extract_region(&buffer, region)?;
    let bytes = encode_with(&clip, request, settings)?;
    write_output(output, &bytes)?;

    println!(
        "Clip written: {} ({:.3}s)",
        output.display(),
        clip.duration_secs()
    );
    Ok(())
}

/// Cut several ranges into a directory with a manifest.
pub fn clips(
    settings: &Settings,
    input: &Path,
    ranges: &[String],
    output: &Path,
    encode_args: &EncodeArgs,
) -> Result<()> {
    let request = encode_args.request(settings)?;
    let buffer = load_audio(input)?;

    let regions = ranges
        .iter()
        .map(|text| {
            let (start, end) = parse_range(text)?;
            Region::from_seconds(start, end, buffer.sample_rate())
        })
        .collect::<Result<Vec<_>>>()?;

    let source_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let mut lame = LameEncoder::new(&settings.encoder.lame_path);
    let encoder: Option<&mut dyn BlockEncoder> = match request {
        EncodingRequest::Mp3 { .. } => Some(&mut lame as &mut dyn BlockEncoder),
        EncodingRequest::Wav => None,
    };

    let export = export_clips(
        &buffer,
        &regions,
        request,
        encoder,
        output,
        &source_name,
        &mut LogProgress::new(),
    )?;

    for entry in &export.manifest.entries {
        println!("{}  {} bytes  sha256 {}", entry.file_name, entry.bytes, entry.sha256);
    }
    println!("Manifest: {}", export.manifest_path.display());
    Ok(())
}

/// Join files end to end.
pub fn merge(
    settings: &Settings,
    inputs: &[PathBuf],
    dir: Option<&Path>,
    output: &Path,
    encode_args: &EncodeArgs,
) -> Result<()> {
    let request = encode_args.request(settings)?;

    let paths = match dir {
        Some(dir) => collect_wav_files(dir)?,
        None => inputs.to_vec(),
    };
    if paths.is_empty() {
        return Err(ClipsmithError::InvalidArgument {
            reason: "no input files to merge".to_string(),
        });
    }

    let buffers = paths
        .iter()
        .map(|path| load_audio(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_buffers(&buffers, &mut NoProgress).map_err(|e| {
        if let ClipsmithError::FormatMismatch { index, .. } = &e {
            warn!("Incompatible input: {}", paths[*index].display());
        }
        e
    })?;

    let bytes = encode_with(&merged, request, settings)?;
    write_output(output, &bytes)?;

    println!(
        "Merged {} files into {} ({:.3}s)",
        paths.len(),
        output.display(),
        merged.duration_secs()
    );
    Ok(())
}

/// Remove silence, normalize and change speed.
#[allow(clippy::too_many_arguments)]
pub fn toolkit(
    settings: &Settings,
    input: &Path,
    output: &Path,
    threshold_db: Option<f32>,
    padding: Option<f64>,
    keep_silence: bool,
    no_normalize: bool,
    speed: Option<f64>,
    encode_args: &EncodeArgs,
) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(threshold_db) = threshold_db {
        settings.silence.threshold_db = threshold_db;
    }
    if let Some(padding) = padding {
        settings.silence.padding_seconds = padding;
    }
    if keep_silence {
        settings.toolkit.remove_silence = false;
    }
    if no_normalize {
        settings.toolkit.normalize = false;
    }
    if let Some(speed) = speed {
        settings.toolkit.speed = speed;
    }
    settings.validate()?;

    let request = encode_args.request(&settings)?;
    let buffer = load_audio(input)?;

    let result = run_toolkit(&buffer, &settings.toolkit_options(), &mut LogProgress::new())?;
    let bytes = encode_with(&result.buffer, request, &settings)?;
    write_output(output, &bytes)?;

    let report = &result.report;
    println!("Toolkit output: {}", output.display());
    println!("Frames: {} -> {}", report.input_frames, report.output_frames);
    if let Some(kept) = report.segments_kept {
        println!("Segments kept: {}", kept);
    }
    if let Some(gain) = report.gain {
        println!("Gain: x{:.3}", gain);
    }
    if report.speed != 1.0 {
        println!("Speed: x{}", report.speed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_wav;
    use tempfile::tempdir;

    fn write_tone(path: &Path, frames: usize, sample_rate: u32) {
        let samples: Vec<f32> = (0..frames).map(|i| ((i as f32) * 0.05).sin() * 0.3).collect();
        let buffer = PcmBuffer::from_channels(vec![samples], sample_rate).unwrap();
        write_output(path, &encode_wav(&buffer).unwrap()).unwrap();
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("1.5-3").unwrap(), (1.5, 3.0));
        assert_eq!(parse_range(" 0 - 2.25 ").unwrap(), (0.0, 2.25));
        assert!(parse_range("1.5").is_err());
        assert!(parse_range("a-b").is_err());
    }

    #[test]
    fn test_collect_wav_files_sorted() {
        let dir = tempdir().unwrap();
        write_tone(&dir.path().join("b.wav"), 10, 8000);
        write_tone(&dir.path().join("a.WAV"), 10, 8000);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = collect_wav_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.WAV", "b.wav"]);
    }

    #[test]
    fn test_clip_command_writes_region() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_tone(&input, 8000, 8000);

        clip(
            &Settings::default(),
            &input,
            0.25,
            0.5,
            &output,
            &EncodeArgs::default(),
        )
        .unwrap();

        assert_eq!(load_audio(&output).unwrap().frame_count(), 2000);
    }

    #[test]
    fn test_merge_command_from_dir() {
        let dir = tempdir().unwrap();
        let inputs = dir.path().join("parts");
        std::fs::create_dir_all(&inputs).unwrap();
        write_tone(&inputs.join("1.wav"), 100, 8000);
        write_tone(&inputs.join("2.wav"), 50, 8000);
        let output = dir.path().join("merged.wav");

        merge(
            &Settings::default(),
            &[],
            Some(&inputs),
            &output,
            &EncodeArgs::default(),
        )
        .unwrap();

        assert_eq!(load_audio(&output).unwrap().frame_count(), 150);
    }

    #[test]
    fn test_toolkit_command_rejects_out_of_range_speed() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.wav");
        write_tone(&input, 100, 8000);

        let result = toolkit(
            &Settings::default(),
            &input,
            &dir.path().join("out.wav"),
            None,
            None,
            false,
            false,
            Some(5.0),
            &EncodeArgs::default(),
        );
        assert!(matches!(result, Err(ClipsmithError::InvalidArgument { .. })));
    }
}
