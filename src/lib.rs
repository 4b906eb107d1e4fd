//! Deep-merge a directory of JSON documents into one.

pub mod batch;
pub mod deep_merge;

pub use batch::{run, BatchError, FileError, MergeConfig, MergeReport, SkippedFile};
pub use deep_merge::{merge, merge_all, merge_into};
