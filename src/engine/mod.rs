//! Audio Engine Module
//!
//! Core buffer model and I/O:
//! - PCM buffer, regions and segments
//! - WAV decoding and output writing

pub mod buffer;
pub mod io;

pub use buffer::{db_to_linear, linear_to_db, PcmBuffer, Region, Segment};
pub use io::{decode_wav, load_audio, sha256_hex, write_output, ExportManifest, ManifestEntry};
