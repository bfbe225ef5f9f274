//! Audio file I/O for Clipsmith
//!
//! The decode boundary (WAV via hound) and output writing. Decoded audio
//! keeps its original sample rate and channel count.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hound::{SampleFormat, WavReader};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::buffer::{PcmBuffer, Region};
use crate::error::{ClipsmithError, Result};

/// Decode a WAV byte stream into a buffer
///
/// 16-bit samples are scaled back with the same asymmetry used when
/// encoding (negatives by 32768, the rest by 32767), so a buffer survives an
/// encode/decode round trip to within one quantization step.
///
/// # Errors
/// * `DecodeError` - if the bytes are not a readable WAV stream, use an
///   unsupported bit depth, or hold no frames
pub fn decode_wav(bytes: &[u8]) -> Result<PcmBuffer> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| ClipsmithError::DecodeError {
        reason: format!("Failed to open WAV stream: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    if channels == 0 || samples.is_empty() {
        return Err(ClipsmithError::DecodeError {
            reason: "WAV stream contains no audio frames".to_string(),
            source: None,
        });
    }

    debug!(
        "Decoded WAV: {}ch, {}Hz, {}-bit, {} samples",
        channels,
        spec.sample_rate,
        spec.bits_per_sample,
        samples.len()
    );

    PcmBuffer::from_interleaved(&samples, channels, spec.sample_rate).map_err(|e| {
        ClipsmithError::DecodeError {
            reason: format!("Malformed sample data: {}", e),
            source: Some(Box::new(e)),
        }
    })
}

/// Load a WAV file from disk
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `DecodeError` - If the file is not a valid WAV file
pub fn load_audio(path: &Path) -> Result<PcmBuffer> {
    if !path.exists() {
        return Err(ClipsmithError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes = std::fs::read(path)?;
    let buffer = decode_wav(&bytes)?;

    info!(
        "Loaded {}: {}, {} frames ({:.2}s)",
        path.display(),
        buffer.format_label(),
        buffer.frame_count(),
        buffer.duration_secs()
    );

    Ok(buffer)
}

/// Write encoded bytes to `path`, creating parent directories as needed
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

// ============================================================================
// Export manifest
// ============================================================================

/// One exported file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file_name: String,
    /// Source range the file was cut from, when it is a clip
    pub region: Option<Region>,
    pub frames: usize,
    pub bytes: usize,
    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
}

/// Listing written next to a batch of exported clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<ManifestEntry>,
}

impl ExportManifest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Record a file's metadata and checksum
    pub fn add(
        &mut self,
        file_name: impl Into<String>,
        region: Option<Region>,
        frames: usize,
        contents: &[u8],
    ) {
        self.entries.push(ManifestEntry {
            file_name: file_name.into(),
            region,
            frames,
            bytes: contents.len(),
            sha256: sha256_hex(contents),
        });
    }

    /// Write as pretty JSON to `dir/manifest.json`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join("manifest.json");
        let json = serde_json::to_string_pretty(self)?;
        write_output(&path, json.as_bytes())?;
        Ok(path)
    }
}

/// Hex-encoded SHA-256 digest
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read interleaved samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let decode_err = |e: hound::Error| ClipsmithError::DecodeError {
        reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(dequantize_i16))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        // 24-bit stored as i32 in hound
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(decode_err),
        (format, bits) => Err(ClipsmithError::DecodeError {
            reason: format!("Unsupported sample format: {}-bit {:?}", bits, format),
            source: None,
        }),
    }
}

/// Inverse of the 16-bit quantizer
#[inline]
fn dequantize_i16(v: i16) -> f32 {
    if v < 0 {
        v as f32 / 32768.0
    } else {
        v as f32 / 32767.0
    }
}

// ============================================================================
// Tests
// ============================================================================
