//! Batch clip export
//!
//! Cuts several regions out of one source, encodes each, and writes them
//! into a directory together with a checksummed manifest.

use std::path::{Path, PathBuf};

use log::info;

use crate::codec::{encode, BlockEncoder, EncodingRequest};
use crate::dsp::extract_region;
use crate::engine::{write_output, ExportManifest, PcmBuffer, Region};
use crate::error::Result;
use crate::progress::{NoProgress, ProgressSink};

/// Result of a batch export
#[derive(Debug, Clone)]
pub struct ClipExport {
    pub files: Vec<PathBuf>,
    pub manifest: ExportManifest,
    pub manifest_path: PathBuf,
}

/// Write each region of `buffer` to `out_dir/clip_<n>.<ext>` (n from 1)
///
/// All regions are validated before anything is written.
pub fn export_clips(
    buffer: &PcmBuffer,
    regions: &[Region],
    request: EncodingRequest,
    mut encoder: Option<&mut dyn BlockEncoder>,
    out_dir: &Path,
    source_name: &str,
    progress: &mut dyn ProgressSink,
) -> Result<ClipExport> {
    for region in regions {
        region.validate(buffer.frame_count())?;
    }

    let mut manifest = ExportManifest::new(source_name);
    let mut files = Vec::with_capacity(regions.len());

    for (i, region) in regions.iter().enumerate() {
        let clip = extract_region(buffer, *region)?;
        let clip_encoder = encoder.as_mut().map(|e| &mut **e as &mut dyn BlockEncoder);
        let bytes = encode(&clip, request, clip_encoder, &mut NoProgress)?;

        let file_name = format!("clip_{}.{}", i + 1, request.extension());
        let path = out_dir.join(&file_name);
        write_output(&path, &bytes)?;

        manifest.add(file_name, Some(*region), clip.frame_count(), &bytes);
        files.push(path);
        progress.report("export", (i + 1) as f32 / regions.len() as f32);
    }

    let manifest_path = manifest.save(out_dir)?;
    info!("Exported {} clips to {}", files.len(), out_dir.display());

    Ok(ClipExport {
        files,
        manifest,
        manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mp3::tests::RecordingEncoder;
    use crate::codec::Mp3Bitrate;
    use crate::engine::{load_audio, sha256_hex};
    use crate::error::ClipsmithError;
    use tempfile::tempdir;

    fn source() -> PcmBuffer {
        let samples: Vec<f32> = (0..8000).map(|i| ((i as f32) * 0.01).sin() * 0.5).collect();
        PcmBuffer::from_channels(vec![samples], 8000).unwrap()
    }

    #[test]
    fn test_export_wav_clips_with_manifest() {
        let dir = tempdir().unwrap();
        let regions = [Region::new(0, 800), Region::new(4000, 8000)];

        let export = export_clips(
            &source(),
            &regions,
            EncodingRequest::Wav,
            None,
            dir.path(),
            "source.wav",
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(export.files.len(), 2);
        assert!(export.manifest_path.ends_with("manifest.json"));
        assert_eq!(export.manifest.entries[1].file_name, "clip_2.wav");
        assert_eq!(export.manifest.entries[1].frames, 4000);

        let second = load_audio(&export.files[1]).unwrap();
        assert_eq!(second.frame_count(), 4000);

        let bytes = std::fs::read(&export.files[0]).unwrap();
        assert_eq!(export.manifest.entries[0].sha256, sha256_hex(&bytes));
    }

    #[test]
    fn test_export_mp3_reuses_encoder() {
        let dir = tempdir().unwrap();
        let mut encoder = RecordingEncoder::default();
        let request = EncodingRequest::Mp3 {
            bitrate: Mp3Bitrate::Kbps128,
        };
        let encoder_ref: &mut dyn BlockEncoder = &mut encoder;

        let export = export_clips(
            &source(),
            &[Region::new(0, 100), Region::new(100, 200)],
            request,
            Some(encoder_ref),
            dir.path(),
            "source.wav",
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(export.files[0].extension().unwrap(), "mp3");
        assert_eq!(encoder.flushes, 2);
    }

    #[test]
    fn test_invalid_region_writes_nothing() {
        let dir = tempdir().unwrap();
        let result = export_clips(
            &source(),
            &[Region::new(0, 100), Region::new(7000, 9000)],
            EncodingRequest::Wav,
            None,
            dir.path(),
            "source.wav",
            &mut NoProgress,
        );

        assert!(matches!(result, Err(ClipsmithError::InvalidRegion { .. })));
        assert!(!dir.path().join("clip_1.wav").exists());
    }
}
