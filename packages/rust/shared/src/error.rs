//! Error types for videosync.
//!
//! Library crates use [`VideoSyncError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all videosync operations.
#[derive(Debug, thiserror::Error)]
pub enum VideoSyncError {
    /// Configuration loading or validation error (missing API key, bad TOML).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during an API fetch.
    #[error("network error: {0}")]
    Network(String),

    /// XML, JSON, or JSON-LD parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A required upstream or on-disk entity does not exist
    /// (channel without uploads, sitemap without the videos block).
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invalid video id, bad sitemap entry).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A patched sitemap failed to parse back as well-formed XML.
    #[error("malformed output at {path:?}: {message}")]
    MalformedOutput { path: PathBuf, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VideoSyncError>;

impl VideoSyncError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a not-found error naming the missing entity.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-output error for a written sitemap.
    pub fn malformed_output(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MalformedOutput {
            path: path.into(),
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = VideoSyncError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = VideoSyncError::not_found("videos <url> block in sitemap.xml");
        assert!(err.to_string().contains("videos <url> block"));
    }

    #[test]
    fn malformed_output_names_the_file() {
        let err = VideoSyncError::malformed_output("sitemap.xml", "unexpected end of stream");
        let msg = err.to_string();
        assert!(msg.contains("sitemap.xml"));
        assert!(msg.contains("unexpected end of stream"));
    }
}
