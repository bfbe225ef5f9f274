//! Error handling for Clipsmith
//!
//! Every core operation returns a typed failure; nothing panics on bad input shape.

use thiserror::Error;

/// Result type alias for Clipsmith operations
pub type Result<T> = std::result::Result<T, ClipsmithError>;

/// Main error type for Clipsmith operations
#[derive(Error, Debug)]
pub enum ClipsmithError {
    // Construction Errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Index / Range Errors
    #[error("Out of bounds: {reason}")]
    OutOfBounds { reason: String },

    #[error("Invalid region: [{start}, {end}) in buffer of {frame_count} frames")]
    InvalidRegion {
        start: usize,
        end: usize,
        frame_count: usize,
    },

    // Combination Errors
    #[error("Format mismatch at input {index}: expected {expected}, found {found}")]
    FormatMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Unsupported channel layout: {channels} channels (only mono/stereo)")]
    UnsupportedChannelLayout { channels: usize },

    // Codec Errors
    #[error("Decode error: {reason}")]
    DecodeError {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Encode error: {reason}")]
    EncodeError { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClipsmithError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ClipsmithError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ClipsmithError::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            ClipsmithError::InvalidRegion { .. } => "INVALID_REGION",
            ClipsmithError::FormatMismatch { .. } => "FORMAT_MISMATCH",
            ClipsmithError::UnsupportedChannelLayout { .. } => "UNSUPPORTED_CHANNEL_LAYOUT",
            ClipsmithError::DecodeError { .. } => "DECODE_ERROR",
            ClipsmithError::EncodeError { .. } => "ENCODE_ERROR",
            ClipsmithError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ClipsmithError::Io(_) => "IO_ERROR",
            ClipsmithError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can fix this by changing their input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClipsmithError::InvalidArgument { .. }
                | ClipsmithError::InvalidRegion { .. }
                | ClipsmithError::FormatMismatch { .. }
                | ClipsmithError::UnsupportedChannelLayout { .. }
                | ClipsmithError::FileNotFound { .. }
                | ClipsmithError::DecodeError { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ClipsmithError::InvalidRegion { .. } => vec![
                "Check that the start time is before the end time",
                "Make sure the end time does not run past the end of the audio",
            ],
            ClipsmithError::FormatMismatch { .. } => vec![
                "All merged files must share channel count and sample rate",
                "Convert the mismatched file before merging",
            ],
            ClipsmithError::UnsupportedChannelLayout { .. } => vec![
                "MP3 export supports mono and stereo only",
                "Export as WAV instead, or downmix first",
            ],
            ClipsmithError::DecodeError { .. } => vec![
                "Try converting the file to 16-bit PCM WAV first",
                "The file may be corrupted - try re-exporting from source",
            ],
            ClipsmithError::EncodeError { .. } => vec![
                "Check that the `lame` encoder is installed and on PATH",
                "Set CLIPSMITH_LAME to the encoder binary",
            ],
            ClipsmithError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ClipsmithError::InvalidRegion {
            start: 10,
            end: 5,
            frame_count: 100,
        };
        assert_eq!(err.error_code(), "INVALID_REGION");
        assert!(err.to_string().contains("[10, 5)"));
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = ClipsmithError::FormatMismatch {
            index: 1,
            expected: "2ch @ 44100Hz".to_string(),
            found: "1ch @ 44100Hz".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_not_recoverable() {
        let err = ClipsmithError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!err.is_recoverable());
    }
}
