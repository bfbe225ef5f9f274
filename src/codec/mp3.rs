//! MP3 frame driver
//!
//! The MP3 bitstream itself comes from an external block encoder. This module
//! quantizes the buffer, splits it into fixed-size blocks per channel, feeds
//! them to the encoder and collects the emitted bytes.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::wav::quantize_channel;
use crate::engine::PcmBuffer;
use crate::error::{ClipsmithError, Result};
use crate::progress::ProgressSink;

/// Samples per channel handed to the encoder per call (one MPEG-1 Layer III frame)
pub const MP3_BLOCK_SIZE: usize = 1152;

/// Supported constant bitrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Mp3Bitrate {
    #[default]
    Kbps128,
    Kbps192,
    Kbps320,
}

impl Mp3Bitrate {
    pub fn kbps(&self) -> u32 {
        match self {
            Mp3Bitrate::Kbps128 => 128,
            Mp3Bitrate::Kbps192 => 192,
            Mp3Bitrate::Kbps320 => 320,
        }
    }
}

impl TryFrom<u32> for Mp3Bitrate {
    type Error = ClipsmithError;

    fn try_from(kbps: u32) -> Result<Self> {
        match kbps {
            128 => Ok(Mp3Bitrate::Kbps128),
            192 => Ok(Mp3Bitrate::Kbps192),
            320 => Ok(Mp3Bitrate::Kbps320),
            other => Err(ClipsmithError::InvalidArgument {
                reason: format!("unsupported MP3 bitrate {} kbps (use 128, 192 or 320)", other),
            }),
        }
    }
}

impl From<Mp3Bitrate> for u32 {
    fn from(bitrate: Mp3Bitrate) -> u32 {
        bitrate.kbps()
    }
}

impl fmt::Display for Mp3Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kbps", self.kbps())
    }
}

/// Capability interface over an MP3 bitstream encoder
///
/// One instance is created by the caller and passed by reference into
/// [`encode_mp3`]; it is reconfigured at the start of every stream.
pub trait BlockEncoder {
    /// Start a new stream with the given layout and bitrate
    fn configure(&mut self, channels: usize, sample_rate: u32, bitrate: Mp3Bitrate)
        -> Result<()>;

    /// Encode one block; `right` is `None` for mono streams
    fn encode(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>>;

    /// Emit any frames still held by the encoder and end the stream
    fn flush(&mut self) -> Result<Vec<u8>>;
}

/// Encode a buffer to an MP3 byte stream through `encoder`
///
/// # Errors
/// * `UnsupportedChannelLayout` - if the buffer has more than two channels
/// * `EncodeError` - propagated from the encoder
pub fn encode_mp3<E>(
    buffer: &PcmBuffer,
    bitrate: Mp3Bitrate,
    encoder: &mut E,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<u8>>
where
    E: BlockEncoder + ?Sized,
{
    let channels = buffer.channel_count();
    if channels > 2 {
        return Err(ClipsmithError::UnsupportedChannelLayout { channels });
    }

    encoder.configure(channels, buffer.sample_rate(), bitrate)?;

    let left = quantize_channel(buffer.channel(0));
    let right = if channels == 2 {
        Some(quantize_channel(buffer.channel(1)))
    } else {
        None
    };

    let frames = buffer.frame_count();
    let mut output = Vec::new();
    let mut blocks = 0usize;

    for start in (0..frames).step_by(MP3_BLOCK_SIZE) {
        let end = (start + MP3_BLOCK_SIZE).min(frames);
        let right_block = right.as_ref().map(|r| &r[start..end]);

        output.extend(encoder.encode(&left[start..end], right_block)?);
        blocks += 1;
        progress.report("mp3", end as f32 / frames as f32);
    }

    output.extend(encoder.flush()?);

    debug!(
        "Encoded MP3 at {}: {} blocks, {} bytes",
        bitrate,
        blocks,
        output.len()
    );

    Ok(output)
}
