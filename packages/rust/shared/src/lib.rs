//! Shared types, error model, and configuration for videosync.
//!
//! This crate is the foundation depended on by all other videosync crates.
//! It provides:
//! - [`VideoSyncError`] — the unified error type
//! - Domain types ([`VideoRecord`], [`RawVideo`], [`VideoDetails`], [`VideoId`])
//! - Configuration ([`AppConfig`], [`SiteConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, SiteConfig, SiteSection, SyncSection, YoutubeConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, VideoSyncError};
pub use types::{
    FetchOutcome, MAX_DESC_LEN, MAX_TAG_LEN, MAX_TAGS, MAX_TITLE_LEN, RawVideo, VideoDetails,
    VideoId, VideoRecord,
};
