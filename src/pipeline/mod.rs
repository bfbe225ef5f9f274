//! Processing pipelines
//!
//! Chains of buffer transformations ending in a serializer:
//! - toolkit: silence removal, normalization, speed change
//! - merge: compatibility check and concatenation
//! - clip export: several regions of one source written as separate files

mod export;
mod merge;
mod toolkit;

pub use export::{export_clips, ClipExport};
pub use merge::{merge_buffers, merge_to_wav};
pub use toolkit::{
    remove_silence, run_toolkit, run_toolkit_to_wav, ToolkitOptions, ToolkitOutput, ToolkitReport,
};
