//! Local-mode fetcher: JSON-LD `ItemList` extraction from an HTML page.
//!
//! The videos page embeds its listing as structured data. We take the first
//! `application/ld+json` script block whose top-level `@type` is `ItemList`
//! and turn its `VideoObject` items into raw video records. Items whose
//! URLs do not yield a valid platform token are dropped.

use std::collections::HashMap;
use std::path::Path;

use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use videosync_shared::{FetchOutcome, RawVideo, Result, VideoDetails, VideoId, VideoSyncError};

// ---------------------------------------------------------------------------
// JSON-LD shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LdItemList {
    #[serde(rename = "@type")]
    type_tag: String,
    #[serde(rename = "itemListElement", default)]
    elements: Vec<LdListElement>,
}

#[derive(Debug, Deserialize)]
struct LdListElement {
    item: Option<LdVideoObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LdVideoObject {
    #[serde(rename = "@type")]
    type_tag: Option<String>,
    name: Option<String>,
    description: Option<String>,
    thumbnail_url: Option<String>,
    upload_date: Option<String>,
    content_url: Option<String>,
    embed_url: Option<String>,
    duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Read a local HTML page and extract its JSON-LD video listing.
///
/// Fails with `NotFound` if the page contains no `ItemList` block.
#[instrument(skip_all, fields(page = %page.display()))]
pub fn fetch_from_page(page: &Path) -> Result<FetchOutcome> {
    let html = std::fs::read_to_string(page).map_err(|e| VideoSyncError::io(page, e))?;
    let list = find_item_list(&html).ok_or_else(|| {
        VideoSyncError::not_found(format!("ItemList JSON-LD block in {}", page.display()))
    })?;

    let mut videos = Vec::new();
    let mut details = HashMap::new();

    for element in list.elements {
        let Some(item) = element.item else { continue };
        if item.type_tag.as_deref() != Some("VideoObject") {
            continue;
        }

        let Some(id) = extract_video_id(&item) else {
            warn!(name = item.name.as_deref().unwrap_or(""), "skipping item without a valid video token");
            continue;
        };

        if let Some(duration) = item.duration {
            details.insert(
                id.to_string(),
                VideoDetails {
                    duration_iso: Some(duration),
                    ..VideoDetails::default()
                },
            );
        }

        videos.push(RawVideo {
            id,
            title: item.name.unwrap_or_default(),
            description: item.description.unwrap_or_default(),
            thumbnail_url: item.thumbnail_url.unwrap_or_default(),
            published_at: item.upload_date.unwrap_or_default(),
            tags: Vec::new(),
            category_id: None,
        });
    }

    debug!(videos = videos.len(), "local page extraction complete");

    Ok(FetchOutcome {
        videos,
        details,
        categories: HashMap::new(),
    })
}

/// Find the first JSON-LD script block declaring itself an `ItemList`.
/// Blocks that fail to parse as JSON are skipped, not errors.
fn find_item_list(html: &str) -> Option<LdItemList> {
    let doc = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    for script in doc.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<LdItemList>(&raw) {
            Ok(list) if list.type_tag == "ItemList" => return Some(list),
            _ => continue,
        }
    }

    None
}

/// Extract the video token from the canonical or embed URL, taking the
/// final path segment.
fn extract_video_id(item: &LdVideoObject) -> Option<VideoId> {
    let url = item
        .content_url
        .as_deref()
        .or(item.embed_url.as_deref())?;
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    VideoId::new(segment)
}
