//! External `lame` encoder adapter
//!
//! Implements [`BlockEncoder`] by streaming raw 16-bit little-endian PCM into
//! a `lame` child process. The child's stdout is drained on a reader thread so
//! a full pipe never blocks the writer; all bytes are handed back on flush.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use log::{debug, info};

use crate::codec::mp3::{BlockEncoder, Mp3Bitrate};
use crate::error::{ClipsmithError, Result};

/// Environment variable overriding the encoder binary
pub const LAME_ENV_VAR: &str = "CLIPSMITH_LAME";

/// A running encoder process
struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: JoinHandle<std::io::Result<Vec<u8>>>,
    channels: usize,
}

/// [`BlockEncoder`] backed by the `lame` command-line encoder
pub struct LameEncoder {
    program: PathBuf,
    session: Option<Session>,
}

impl LameEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            session: None,
        }
    }

    /// Command-line arguments for a raw PCM stream on stdin and MP3 on stdout
    fn arguments(channels: usize, sample_rate: u32, bitrate: Mp3Bitrate) -> Vec<String> {
        let mode = if channels == 1 { "m" } else { "j" };
        vec![
            "--quiet".to_string(),
            "-r".to_string(),
            "--signed".to_string(),
            "--little-endian".to_string(),
            "--bitwidth".to_string(),
            "16".to_string(),
            "-s".to_string(),
            format!("{}", sample_rate as f64 / 1000.0),
            "-m".to_string(),
            mode.to_string(),
            "-b".to_string(),
            bitrate.kbps().to_string(),
            "-".to_string(),
            "-".to_string(),
        ]
    }

    fn encode_error(reason: impl Into<String>) -> ClipsmithError {
        ClipsmithError::EncodeError {
            reason: reason.into(),
        }
    }
}

impl BlockEncoder for LameEncoder {
    fn configure(
        &mut self,
        channels: usize,
        sample_rate: u32,
        bitrate: Mp3Bitrate,
    ) -> Result<()> {
        if let Some(mut stale) = self.session.take() {
            // A previous stream was never flushed
            let _ = stale.child.kill();
            let _ = stale.child.wait();
        }

        let args = Self::arguments(channels, sample_rate, bitrate);
        info!("Starting encoder: {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Self::encode_error(format!(
                    "failed to start '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stdin = child.stdin.take();
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Self::encode_error("encoder stdout unavailable"))?;

        let reader = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stdout.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.session = Some(Session {
            child,
            stdin,
            reader,
            channels,
        });
        Ok(())
    }

    fn encode(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Self::encode_error("encoder used before configure"))?;

        let mut raw = Vec::with_capacity(left.len() * session.channels * 2);
        match (session.channels, right) {
            (1, None) => {
                for sample in left {
                    raw.extend_from_slice(&sample.to_le_bytes());
                }
            }
            (2, Some(right)) if right.len() == left.len() => {
                for (l, r) in left.iter().zip(right) {
                    raw.extend_from_slice(&l.to_le_bytes());
                    raw.extend_from_slice(&r.to_le_bytes());
                }
            }
            (channels, _) => {
                return Err(Self::encode_error(format!(
                    "block does not match configured {}-channel stream",
                    channels
                )))
            }
        }

        let stdin = session
            .stdin
            .as_mut()
            .ok_or_else(|| Self::encode_error("encoder input already closed"))?;
        stdin
            .write_all(&raw)
            .map_err(|e| Self::encode_error(format!("failed to feed encoder: {}", e)))?;

        // Output is collected by the reader thread and returned on flush
        Ok(Vec::new())
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let mut session = self
            .session
            .take()
            .ok_or_else(|| Self::encode_error("encoder flushed before configure"))?;

        // Closing stdin signals end of stream
        drop(session.stdin.take());

        let status = session
            .child
            .wait()
            .map_err(|e| Self::encode_error(format!("encoder did not exit: {}", e)))?;

        let bytes = session
            .reader
            .join()
            .map_err(|_| Self::encode_error("encoder reader thread panicked"))?
            .map_err(|e| Self::encode_error(format!("failed to read encoder output: {}", e)))?;

        if !status.success() {
            return Err(Self::encode_error(format!("encoder exited with {}", status)));
        }

        debug!("Encoder produced {} bytes", bytes.len());
        Ok(bytes)
    }
}

impl Drop for LameEncoder {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.child.kill();
            let _ = session.child.wait();
        }
    }
}
