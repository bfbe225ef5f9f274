//! Buffer Transformations
//!
//! Pure operations over PCM buffers. Each one reads its input and returns a
//! new buffer, so any of them may run concurrently on distinct buffers.

pub mod compositor;
pub mod normalize;
pub mod region;
pub mod silence;
pub mod speed;

pub use compositor::{check_compatible, compose_from_segments, concatenate, merge_overlapping};
pub use normalize::{normalize, normalize_with_gain, Normalized};
pub use region::extract_region;
pub use silence::{detect_segments, SilenceParams, DEFAULT_PADDING_SECS, DEFAULT_THRESHOLD_DB};
pub use speed::{change_speed, output_frame_count, MAX_SPEED, MIN_SPEED};
