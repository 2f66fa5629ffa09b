//! Sitemap Patcher: replaces the video container block of an XML sitemap.
//!
//! The container is located structurally (the `<url>` element whose `<loc>`
//! matches the canonical videos URL) and then replaced by splicing its exact
//! byte range in the serialized text, so the rest of the document stays
//! byte-identical. The assembled document is validated before anything is
//! written; a backup of the pre-patch content is written before the primary
//! file.

use std::path::{Path, PathBuf};

use chrono::Utc;
use roxmltree::{Document, Node};
use tracing::{info, instrument};

use videosync_shared::{Result, SiteConfig, VideoSyncError};

/// Header default when the container carries no change frequency.
const DEFAULT_CHANGEFREQ: &str = "weekly";

/// Header default when the container carries no priority.
const DEFAULT_PRIORITY: &str = "0.8";

/// Outcome of one patch run.
#[derive(Debug)]
pub struct PatchOutcome {
    /// The patched document.
    pub path: PathBuf,
    /// Number of video fragments written into the container.
    pub entry_count: usize,
    /// Backup path, unless backups were suppressed.
    pub backup: Option<PathBuf>,
}

/// Patch one sitemap document in place.
///
/// Ordering matters: the backup must exist before the primary file is
/// overwritten, so an interrupted write stays recoverable. The assembled
/// document is additionally validated before any write and re-parsed after
/// the write; either failure is fatal.
#[instrument(skip_all, fields(path = %path.display(), fragments = fragments.len()))]
pub fn patch_sitemap(
    path: &Path,
    fragments: &[String],
    site: &SiteConfig,
    backup: bool,
) -> Result<PatchOutcome> {
    let old_xml = std::fs::read_to_string(path).map_err(|e| VideoSyncError::io(path, e))?;
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let new_xml =
        rebuild_container(&old_xml, fragments, &site.videos_url, &today).map_err(|e| match e {
            VideoSyncError::NotFound { what } => VideoSyncError::not_found(format!(
                "{what} in {}",
                path.display()
            )),
            other => other,
        })?;

    // Validate before touching disk, so a bad assembly never lands on disk.
    if let Err(e) = Document::parse(&new_xml) {
        return Err(VideoSyncError::malformed_output(
            path,
            format!("assembled document would not be well-formed: {e}"),
        ));
    }

    let backup_path = if backup {
        let bak = backup_sibling(path);
        std::fs::write(&bak, &old_xml).map_err(|e| VideoSyncError::io(&bak, e))?;
        Some(bak)
    } else {
        None
    };

    std::fs::write(path, &new_xml).map_err(|e| VideoSyncError::io(path, e))?;

    // Re-parse what actually hit the disk.
    let written = std::fs::read_to_string(path).map_err(|e| VideoSyncError::io(path, e))?;
    if let Err(e) = Document::parse(&written) {
        return Err(VideoSyncError::malformed_output(
            path,
            format!("written document is not well-formed: {e}"),
        ));
    }

    info!(
        path = %path.display(),
        entries = fragments.len(),
        backup = backup_path.is_some(),
        "sitemap updated"
    );

    Ok(PatchOutcome {
        path: path.to_path_buf(),
        entry_count: fragments.len(),
        backup: backup_path,
    })
}

/// Rebuild the container block of a serialized sitemap.
///
/// Locates the `<url>` element anchored by `videos_url`, keeps its change
/// frequency and priority (or synthesizes defaults), rewrites the last
/// modification date to `today`, and splices in the fragments separated by
/// blank lines. Pure: no I/O, no clock.
pub fn rebuild_container(
    xml: &str,
    fragments: &[String],
    videos_url: &str,
    today: &str,
) -> Result<String> {
    let doc = Document::parse(xml)
        .map_err(|e| VideoSyncError::parse(format!("sitemap is not well-formed XML: {e}")))?;

    let container = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "url" && loc_matches(n, videos_url))
        .ok_or_else(|| {
            VideoSyncError::not_found(format!("videos <url> block anchored by {videos_url}"))
        })?;

    let changefreq = child_text(&container, "changefreq").unwrap_or(DEFAULT_CHANGEFREQ);
    let priority = child_text(&container, "priority").unwrap_or(DEFAULT_PRIORITY);

    let mut block = String::new();
    block.push_str("<url>\n");
    block.push_str(&format!("    <loc>{videos_url}</loc>\n"));
    block.push_str(&format!("    <lastmod>{today}</lastmod>\n"));
    block.push_str(&format!("    <changefreq>{changefreq}</changefreq>\n"));
    block.push_str(&format!("    <priority>{priority}</priority>"));
    for fragment in fragments {
        block.push_str("\n\n");
        block.push_str(fragment);
    }
    block.push_str("\n\n  </url>");

    let range = container.range();
    Ok(format!(
        "{}{}{}",
        &xml[..range.start],
        block,
        &xml[range.end..]
    ))
}

/// True if the element has a `<loc>` child whose text equals `videos_url`.
fn loc_matches(node: &Node, videos_url: &str) -> bool {
    node.children().any(|c| {
        c.tag_name().name() == "loc" && c.text().map(str::trim) == Some(videos_url)
    })
}

/// Trimmed text of a direct child element, if present and non-empty.
fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Sibling path carrying the `.bak` suffix.
fn backup_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
