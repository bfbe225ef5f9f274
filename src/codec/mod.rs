//! Output codecs
//!
//! Terminal serializers for PCM buffers:
//! - WAV (bit-exact 16-bit PCM container)
//! - MP3 (block driver over an external bitstream encoder)

pub mod lame;
pub mod mp3;
pub mod wav;

use serde::{Deserialize, Serialize};

use crate::engine::PcmBuffer;
use crate::error::{ClipsmithError, Result};
use crate::progress::ProgressSink;

pub use lame::LameEncoder;
pub use mp3::{encode_mp3, BlockEncoder, Mp3Bitrate, MP3_BLOCK_SIZE};
pub use wav::{encode_wav, quantize_sample, WAV_HEADER_LEN};

/// Requested output container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum EncodingRequest {
    #[default]
    Wav,
    Mp3 { bitrate: Mp3Bitrate },
}

impl EncodingRequest {
    /// File extension for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingRequest::Wav => "wav",
            EncodingRequest::Mp3 { .. } => "mp3",
        }
    }
}

/// Serialize `buffer` as requested
///
/// MP3 output needs an encoder; WAV ignores it.
///
/// # Errors
/// * `EncodeError` - MP3 requested without an encoder, or a buffer whose
///   shape does not fit a WAV header
/// * any error from [`encode_mp3`]
pub fn encode(
    buffer: &PcmBuffer,
    request: EncodingRequest,
    encoder: Option<&mut dyn BlockEncoder>,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<u8>> {
    match request {
        EncodingRequest::Wav => {
            let bytes = encode_wav(buffer)?;
            progress.report("wav", 1.0);
            Ok(bytes)
        }
        EncodingRequest::Mp3 { bitrate } => {
            let encoder = encoder.ok_or_else(|| ClipsmithError::EncodeError {
                reason: "MP3 output requested but no encoder is available".to_string(),
            })?;
            encode_mp3(buffer, bitrate, encoder, progress)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mp3::tests::RecordingEncoder;
    use crate::progress::NoProgress;

    #[test]
    fn test_encode_wav_request() {
        let buffer = PcmBuffer::new(1, 10, 8000).unwrap();
        let bytes = encode(&buffer, EncodingRequest::Wav, None, &mut NoProgress).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 20);
    }

    #[test]
    fn test_encode_mp3_without_encoder() {
        let buffer = PcmBuffer::new(1, 10, 8000).unwrap();
        let request = EncodingRequest::Mp3 {
            bitrate: Mp3Bitrate::Kbps128,
        };
        let result = encode(&buffer, request, None, &mut NoProgress);
        assert!(matches!(result, Err(ClipsmithError::EncodeError { .. })));
    }

    #[test]
    fn test_encode_mp3_with_encoder() {
        let buffer = PcmBuffer::new(2, 10, 8000).unwrap();
        let mut encoder = RecordingEncoder::default();
        let request = EncodingRequest::Mp3 {
            bitrate: Mp3Bitrate::Kbps320,
        };

        let encoder: &mut dyn BlockEncoder = &mut encoder;

        let bytes = encode(&buffer, request, Some(encoder), &mut NoProgress).unwrap();
        assert_eq!(bytes, vec![1, b'E', b'N', b'D']);
        assert_eq!(request.extension(), "mp3");
    }

    #[test]
    fn test_request_serde() {
        let request = EncodingRequest::Mp3 {
            bitrate: Mp3Bitrate::Kbps192,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"format":"mp3","bitrate":192}"#);
        let wav: EncodingRequest = serde_json::from_str(r#"{"format":"wav"}"#).unwrap();
        assert_eq!(wav, EncodingRequest::Wav);
    }
}
