//! WAV serialization
//!
//! Writes the canonical 44-byte-header 16-bit PCM layout. This is the byte
//! format handed to every downstream collaborator, so the header is laid out
//! by hand rather than left to a writer library's choice of fmt chunk.

use log::debug;

use crate::engine::PcmBuffer;
use crate::error::{ClipsmithError, Result};

/// Size of the RIFF/fmt/data header preceding the sample data
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;
const FORMAT_PCM: u16 = 1;

/// Quantize one float sample to signed 16-bit PCM
///
/// Clamps to [-1, 1], scales negatives by 32768 and non-negatives by 32767,
/// then truncates toward zero.
#[inline]
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Quantize a whole channel
pub fn quantize_channel(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| quantize_sample(s)).collect()
}

/// Header fields that depend on the buffer's shape
struct HeaderFields {
    channels: u16,
    block_align: u16,
    byte_rate: u32,
    data_len: u32,
    riff_len: u32,
}

impl HeaderFields {
    /// Compute the fields, failing when one does not fit its header slot
    fn for_buffer(buffer: &PcmBuffer) -> Result<Self> {
        let overflow = |field: &str| ClipsmithError::EncodeError {
            reason: format!(
                "{} does not fit a WAV header ({} frames, {})",
                field,
                buffer.frame_count(),
                buffer.format_label()
            ),
        };

        let channels =
            u16::try_from(buffer.channel_count()).map_err(|_| overflow("channel count"))?;
        let block_align = channels
            .checked_mul(BYTES_PER_SAMPLE as u16)
            .ok_or_else(|| overflow("block align"))?;
        let byte_rate = buffer
            .sample_rate()
            .checked_mul(block_align as u32)
            .ok_or_else(|| overflow("byte rate"))?;
        let data_len = u32::try_from(buffer.frame_count())
            .ok()
            .and_then(|frames| frames.checked_mul(block_align as u32))
            .ok_or_else(|| overflow("data length"))?;
        let riff_len = data_len.checked_add(36).ok_or_else(|| overflow("RIFF length"))?;

        Ok(Self {
            channels,
            block_align,
            byte_rate,
            data_len,
            riff_len,
        })
    }
}

/// Serialize a buffer to a complete WAV byte stream
///
/// # Errors
/// * `EncodeError` - if the channel count, byte rate or data size cannot be
///   represented in the 16/32-bit header fields
///
/// # Example
/// ```
/// use clipsmith::codec::wav::{encode_wav, WAV_HEADER_LEN};
/// use clipsmith::engine::PcmBuffer;
///
/// let buffer = PcmBuffer::new(2, 10, 44100).unwrap();
/// let bytes = encode_wav(&buffer).unwrap();
/// assert_eq!(bytes.len(), WAV_HEADER_LEN + 10 * 2 * 2);
/// assert_eq!(&bytes[0..4], b"RIFF");
/// ```
pub fn encode_wav(buffer: &PcmBuffer) -> Result<Vec<u8>> {
    let header = HeaderFields::for_buffer(buffer)?;
    let frames = buffer.frame_count();
    let sample_rate = buffer.sample_rate();
    let data_len = header.data_len as usize;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&header.riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&header.channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&header.byte_rate.to_le_bytes());
    out.extend_from_slice(&header.block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&header.data_len.to_le_bytes());

    for frame in 0..frames {
        for channel in buffer.channels() {
            out.extend_from_slice(&quantize_sample(channel[frame]).to_le_bytes());
        }
    }

    debug!(
        "Encoded WAV: {} frames, {}, {} bytes",
        frames,
        buffer.format_label(),
        out.len()
    );

    Ok(out)
}
