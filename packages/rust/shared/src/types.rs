//! Core domain types for the video sitemap synchronizer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maximum number of tags emitted per video entry.
pub const MAX_TAGS: usize = 10;

/// Maximum length of a single tag, in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Maximum length of a cleaned title, in characters.
pub const MAX_TITLE_LEN: usize = 150;

/// Maximum raw description length considered before cleaning.
pub const MAX_DESC_LEN: usize = 2000;

// ---------------------------------------------------------------------------
// VideoId
// ---------------------------------------------------------------------------

/// An 11-character YouTube video token (`[A-Za-z0-9_-]{11}`).
///
/// The identifier is the one field a video record is never allowed to lack;
/// everything else is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Validate and wrap a platform video token. Returns `None` unless the
    /// input is exactly 11 characters of `[A-Za-z0-9_-]`.
    pub fn new(s: &str) -> Option<Self> {
        let valid = s.len() == 11
            && s.bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        valid.then(|| Self(s.to_string()))
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://youtu.be/{}", self.0)
    }

    /// Embed-player URL for this video.
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Raw fetch output
// ---------------------------------------------------------------------------

/// One raw upload as returned by the playlist listing or the local
/// JSON-LD block, before any normalization.
#[derive(Debug, Clone)]
pub struct RawVideo {
    /// Platform video token.
    pub id: VideoId,
    /// Free-text title, unbounded.
    pub title: String,
    /// Free-text description, unbounded.
    pub description: String,
    /// Thumbnail URL (best available variant), may be empty.
    pub thumbnail_url: String,
    /// Publication timestamp, ISO-8601, passed through verbatim.
    pub published_at: String,
    /// Tags as given by the source (only the local source carries these;
    /// the API provides them via [`VideoDetails`]).
    pub tags: Vec<String>,
    /// Category id as given by the source, if any.
    pub category_id: Option<String>,
}

/// Per-video technical details from the batch details lookup.
///
/// The details snippet is richer than the playlist snippet, so tags and
/// category taken from here win over the ones on [`RawVideo`].
#[derive(Debug, Clone, Default)]
pub struct VideoDetails {
    /// ISO-8601 duration string (`PT1H2M3S`).
    pub duration_iso: Option<String>,
    /// View count, if the statistics part was available and numeric.
    pub view_count: Option<u64>,
    /// Category id from the video snippet.
    pub category_id: Option<String>,
    /// Tags from the video snippet.
    pub tags: Vec<String>,
}

/// Everything one fetch pass produces: the ordered uploads, the per-video
/// details lookup, and the best-effort category-id-to-name lookup.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Uploads in source order.
    pub videos: Vec<RawVideo>,
    /// Details keyed by video token.
    pub details: HashMap<String, VideoDetails>,
    /// Category names keyed by category id. May be empty if every
    /// category batch failed; the run degrades to raw ids.
    pub categories: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// VideoRecord
// ---------------------------------------------------------------------------

/// A fully normalized video entry, ready to render as a sitemap fragment.
///
/// Records are rebuilt from upstream data on every run and never persisted;
/// only the patched sitemap documents live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video token. Always present.
    pub id: VideoId,
    /// Cleaned title with the publisher suffix applied.
    pub title: String,
    /// Cleaned, entity-decoded, tag-stripped description.
    pub description: String,
    /// Thumbnail URL, may be empty.
    pub thumbnail_url: String,
    /// Publication timestamp, verbatim from the source.
    pub published_at: String,
    /// Duration in whole seconds, if the ISO-8601 duration parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    /// View count, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// Category name when resolved, raw category id otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Normalized tags: at most [`MAX_TAGS`], each at most [`MAX_TAG_LEN`]
    /// characters, deduplicated case-insensitively, first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
