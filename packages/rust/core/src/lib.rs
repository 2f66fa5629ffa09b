//! End-to-end sync pipeline: fetch → normalize → render → patch.

pub mod pipeline;

pub use pipeline::{
    ProgressReporter, SilentProgress, SyncConfig, SyncReport, SyncSource, sync,
};
