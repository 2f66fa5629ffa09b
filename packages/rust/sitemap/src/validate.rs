//! Video sitemap validation.
//!
//! Checks an already-produced video sitemap: every `video:video` entry must
//! carry a thumbnail, a title, at least one of content/player location, and
//! a publication date; a `likes` element is disallowed; view counts must be
//! plain non-negative integer strings. Violations are enumerated per entry
//! (1-based, document order) rather than failing fast.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node};

use videosync_shared::{Result, VideoSyncError};

/// Plain non-negative integer strings; `"12,000"` does not qualify.
static VIEW_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("view count regex"));

/// One rule violation in one video entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based position of the entry in document order.
    pub ordinal: usize,
    /// What is wrong with the entry.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry {}: {}", self.ordinal, self.message)
    }
}

/// Validate a sitemap file. Parse failure is an error; rule violations
/// are returned for the caller to report.
pub fn validate_file(path: &Path) -> Result<Vec<Violation>> {
    let xml = std::fs::read_to_string(path).map_err(|e| VideoSyncError::io(path, e))?;
    validate_str(&xml).map_err(|e| match e {
        VideoSyncError::Parse { message } => {
            VideoSyncError::parse(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Validate serialized sitemap XML.
pub fn validate_str(xml: &str) -> Result<Vec<Violation>> {
    let doc = Document::parse(xml)
        .map_err(|e| VideoSyncError::parse(format!("not well-formed XML: {e}")))?;

    let mut violations = Vec::new();

    let entries = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "video");

    for (i, entry) in entries.enumerate() {
        let ordinal = i + 1;
        check_entry(&entry, ordinal, &mut violations);
    }

    Ok(violations)
}

/// Apply all rules to one `video:video` element.
fn check_entry(entry: &Node, ordinal: usize, violations: &mut Vec<Violation>) {
    let mut violate = |message: String| {
        violations.push(Violation { ordinal, message });
    };

    if element_text(entry, "thumbnail_loc").is_none() {
        violate("missing thumbnail_loc".into());
    }
    if element_text(entry, "title").is_none() {
        violate("missing title".into());
    }
    if element_text(entry, "content_loc").is_none() && element_text(entry, "player_loc").is_none()
    {
        violate("missing both content_loc and player_loc".into());
    }
    if element_text(entry, "publication_date").is_none() {
        violate("missing publication_date".into());
    }
    if entry
        .children()
        .any(|c| c.is_element() && c.tag_name().name() == "likes")
    {
        violate("disallowed likes element".into());
    }
    if let Some(views) = element_text(entry, "view_count") {
        if !VIEW_COUNT_RE.is_match(views) {
            violate(format!("view_count {views:?} is not a non-negative integer"));
        }
    }
}

/// Trimmed, non-empty text of a direct child element.
fn element_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
