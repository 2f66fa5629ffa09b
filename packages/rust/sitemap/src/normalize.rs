//! Field normalization for video metadata.
//!
//! Each pass is a pure function; missing inputs coerce to empty values
//! rather than erroring. Bounds live in `videosync_shared::types`.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use videosync_shared::{
    FetchOutcome, MAX_DESC_LEN, MAX_TAG_LEN, MAX_TAGS, MAX_TITLE_LEN, RawVideo, SiteConfig,
    VideoDetails, VideoRecord,
};

/// Matches runs of whitespace for collapsing.
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Matches embedded URLs in titles.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url regex"));

/// Matches HTML tags for pattern-based stripping. Not a full parser;
/// adequate for the text-only descriptions this pipeline sees.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Matches ISO-8601 durations of the `PT#H#M#S` family.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("duration regex")
});

// ---------------------------------------------------------------------------
// Tag normalization
// ---------------------------------------------------------------------------

/// Normalize a tag list: trim, strip leading `#`, collapse whitespace,
/// truncate to 50 chars, drop empties, dedupe case-insensitively while
/// preserving first-seen order, stop after 10 accepted tags.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for tag in tags {
        let mut s = tag.as_ref().trim().trim_start_matches('#').to_string();
        s = WS_RE.replace_all(&s, " ").trim().to_string();
        if s.chars().count() > MAX_TAG_LEN {
            s = s.chars().take(MAX_TAG_LEN).collect::<String>();
            s = s.trim_end().to_string();
        }
        if s.is_empty() {
            continue;
        }
        let key = s.to_lowercase();
        if !seen.insert(key) {
            continue;
        }
        out.push(s);
        if out.len() >= MAX_TAGS {
            break;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Description cleaning
// ---------------------------------------------------------------------------

/// Clean a description: bound the raw input first, then decode HTML
/// entities, strip tags, and collapse whitespace.
pub fn clean_description(s: &str) -> String {
    let bounded: String = s.chars().take(MAX_DESC_LEN).collect();
    let decoded = html_escape::decode_html_entities(&bounded);
    let stripped = TAG_RE.replace_all(&decoded, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

// ---------------------------------------------------------------------------
// Title cleaning and publisher suffix
// ---------------------------------------------------------------------------

/// Clean a title: remove embedded URLs, collapse whitespace, truncate to
/// 150 chars backing off to the previous word boundary when one exists.
pub fn clean_title(title: &str) -> String {
    let no_urls = URL_RE.replace_all(title, "");
    let mut t = WS_RE.replace_all(&no_urls, " ").trim().to_string();

    if t.chars().count() > MAX_TITLE_LEN {
        t = t.chars().take(MAX_TITLE_LEN).collect::<String>();
        t = t.trim_end().to_string();
        if let Some(idx) = t.rfind(' ') {
            t.truncate(idx);
        }
    }

    t
}

/// Append `" — <publisher>"` unless the title already ends with the
/// publisher name (bare, em-dash, or hyphen separator). Idempotent.
pub fn with_publisher_suffix(title: &str, publisher: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let trimmed = title.trim_end();
    let already_suffixed = trimmed.ends_with(publisher)
        || trimmed.ends_with(&format!("— {publisher}"))
        || trimmed.ends_with(&format!("- {publisher}"));
    if already_suffixed {
        return title.to_string();
    }
    format!("{title} — {publisher}")
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 `PT#H#M#S` duration into whole seconds.
/// Returns `None` on any other shape.
pub fn iso_duration_secs(iso: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(iso)?;
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    Some(part(1) * 3600 + part(2) * 60 + part(3))
}

// ---------------------------------------------------------------------------
// Record assembly
// ---------------------------------------------------------------------------

/// Merge one raw upload with its detail/category lookups into a
/// normalized [`VideoRecord`].
///
/// The details snippet wins over the playlist snippet for tags and
/// category; the category name falls back to the raw id when unresolved.
pub fn assemble_record(
    raw: &RawVideo,
    details: Option<&VideoDetails>,
    categories: &HashMap<String, String>,
    site: &SiteConfig,
) -> VideoRecord {
    let detail_tags = details.map(|d| d.tags.as_slice()).unwrap_or_default();
    let tags = if detail_tags.is_empty() {
        normalize_tags(&raw.tags)
    } else {
        normalize_tags(detail_tags)
    };

    let category_id = details
        .and_then(|d| d.category_id.clone())
        .or_else(|| raw.category_id.clone());
    let category =
        category_id.map(|id| categories.get(&id).cloned().unwrap_or(id));

    let duration_secs = details
        .and_then(|d| d.duration_iso.as_deref())
        .and_then(iso_duration_secs);

    let title = with_publisher_suffix(&clean_title(&raw.title), &site.publisher_name);

    VideoRecord {
        id: raw.id.clone(),
        title,
        description: clean_description(&raw.description),
        thumbnail_url: raw.thumbnail_url.clone(),
        published_at: raw.published_at.clone(),
        duration_secs,
        view_count: details.and_then(|d| d.view_count),
        category,
        tags,
    }
}

/// Assemble records for a whole fetch pass, in source order.
pub fn assemble_records(outcome: &FetchOutcome, site: &SiteConfig) -> Vec<VideoRecord> {
    outcome
        .videos
        .iter()
        .map(|raw| {
            assemble_record(
                raw,
                outcome.details.get(raw.id.as_str()),
                &outcome.categories,
                site,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use videosync_shared::VideoId;

    fn test_site() -> SiteConfig {
        SiteConfig {
            publisher_name: "Publisher Name".into(),
            channel_url_base: "https://www.youtube.com/channel/".into(),
            videos_url: "https://example.com/videos/".into(),
            channel_id: "UCTESTCHANNEL".into(),
        }
    }

    #[test]
    fn tags_trim_strip_dedupe_and_cap() {
        let tags = ["#Berlin", "berlin", "Tech ", "tech", " "];
        assert_eq!(normalize_tags(&tags), vec!["Berlin", "Tech"]);
    }

    #[test]
    fn tags_collapse_internal_whitespace() {
        let tags = ["open   source\tsoftware"];
        assert_eq!(normalize_tags(&tags), vec!["open source software"]);
    }

    #[test]
    fn tags_stop_after_ten() {
        let tags: Vec<String> = (0..20).map(|i| format!("tag{i}")).collect();
        let out = normalize_tags(&tags);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], "tag0");
        assert_eq!(out[9], "tag9");
    }

    #[test]
    fn tags_truncate_to_fifty_chars() {
        let long = "x".repeat(80);
        let out = normalize_tags(&[long]);
        assert_eq!(out[0].chars().count(), 50);
    }

    #[test]
    fn description_decodes_strips_and_collapses() {
        assert_eq!(clean_description("<b>Hi</b>   there"), "Hi there");
        assert_eq!(clean_description("a &amp; b"), "a & b");
        assert_eq!(clean_description(""), "");
    }

    #[test]
    fn description_bounded_before_cleaning() {
        let raw = "y".repeat(3000);
        let cleaned = clean_description(&raw);
        assert_eq!(cleaned.chars().count(), 2000);
    }

    #[test]
    fn title_strips_urls_and_collapses() {
        assert_eq!(
            clean_title("My Video <3 https://x.co"),
            "My Video <3"
        );
    }

    #[test]
    fn title_truncation_backs_off_to_word_boundary() {
        let long = format!("{} tail", "word ".repeat(40).trim_end());
        let cleaned = clean_title(&long);
        assert!(cleaned.chars().count() <= 150);
        assert!(!cleaned.ends_with(' '));
        // Backs off to a full word rather than cutting mid-word
        assert!(cleaned.split(' ').all(|w| w == "word" || w == "tail"));
    }

    #[test]
    fn publisher_suffix_applied_once() {
        let once = with_publisher_suffix("My Video", "Publisher Name");
        assert_eq!(once, "My Video — Publisher Name");
        let twice = with_publisher_suffix(&once, "Publisher Name");
        assert_eq!(twice, once);
    }

    #[test]
    fn publisher_suffix_recognizes_hyphen_variant() {
        let titled = "My Video - Publisher Name";
        assert_eq!(
            with_publisher_suffix(titled, "Publisher Name"),
            titled
        );
    }

    #[test]
    fn publisher_suffix_skips_empty_titles() {
        assert_eq!(with_publisher_suffix("", "Publisher Name"), "");
    }

    #[test]
    fn duration_parsing() {
        assert_eq!(iso_duration_secs("PT1H2M3S"), Some(3723));
        assert_eq!(iso_duration_secs("PT2M"), Some(120));
        assert_eq!(iso_duration_secs("PT45S"), Some(45));
        assert_eq!(iso_duration_secs("P1DT2H"), None);
        assert_eq!(iso_duration_secs("garbage"), None);
    }

    #[test]
    fn assemble_end_to_end_scenario() {
        let raw = RawVideo {
            id: VideoId::new("aaaaaaaaaaa").unwrap(),
            title: "My Video <3 https://x.co".into(),
            description: "<b>Hi</b>   there".into(),
            thumbnail_url: "https://img.example/a.jpg".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
            tags: vec![],
            category_id: None,
        };
        let details = VideoDetails {
            duration_iso: Some("PT1H2M3S".into()),
            view_count: Some(42),
            category_id: Some("28".into()),
            tags: vec!["#fun".into(), "FUN".into(), "coding".into()],
        };
        let categories: HashMap<String, String> =
            [("28".to_string(), "Science & Technology".to_string())].into();

        let record = assemble_record(&raw, Some(&details), &categories, &test_site());

        assert_eq!(record.title, "My Video <3 — Publisher Name");
        assert_eq!(record.description, "Hi there");
        assert_eq!(record.tags, vec!["fun", "coding"]);
        assert_eq!(record.duration_secs, Some(3723));
        assert_eq!(record.view_count, Some(42));
        assert_eq!(record.category.as_deref(), Some("Science & Technology"));
        assert_eq!(record.published_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn unresolved_category_falls_back_to_raw_id() {
        let raw = RawVideo {
            id: VideoId::new("aaaaaaaaaaa").unwrap(),
            title: "T".into(),
            description: String::new(),
            thumbnail_url: String::new(),
            published_at: String::new(),
            tags: vec![],
            category_id: Some("22".into()),
        };
        let record = assemble_record(&raw, None, &HashMap::new(), &test_site());
        assert_eq!(record.category.as_deref(), Some("22"));
        assert_eq!(record.duration_secs, None);
        assert_eq!(record.view_count, None);
    }
}
