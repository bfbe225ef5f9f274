//! Clipsmith - Audio Clip Toolkit
//!
//! Turns a decoded audio signal into new audio artifacts: sub-range clips,
//! concatenations, silence-trimmed, normalized and time-scaled versions, and
//! WAV/MP3 files.
//!
//! # Architecture
//!
//! - `engine`: the PCM buffer value type and the WAV decode boundary
//! - `dsp`: pure buffer transformations (region, silence, compose, normalize, speed)
//! - `codec`: terminal serializers (WAV, MP3 block driver)
//! - `pipeline`: toolkit, merge and batch clip export chains
//!
//! Every transformation returns a new buffer and leaves its input alone, so
//! independent buffers can be processed on separate threads freely.

pub mod cli;
pub mod codec;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod progress;

pub use engine::{PcmBuffer, Region, Segment};
pub use error::{ClipsmithError, Result};
