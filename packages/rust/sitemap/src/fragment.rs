//! XML Block Builder: renders one normalized record as a `video:video`
//! fragment in the fixed schema order.
//!
//! Pure data transformation, deterministic for identical inputs. Free-text
//! values get `&`, `<`, `>` entity-escaped; URLs and fixed flags are
//! assumed safe.

use videosync_shared::{SiteConfig, VideoRecord};

/// Entity-escape `&`, `<`, `>` for embedding in element text.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render one record as an indented `video:video` fragment.
///
/// Element order is fixed; optional elements (duration, category, tags,
/// view count) are emitted only when data is available.
pub fn render_fragment(record: &VideoRecord, site: &SiteConfig) -> String {
    let mut xml: Vec<String> = Vec::new();

    xml.push("    <video:video>".into());
    xml.push(format!(
        "      <video:thumbnail_loc>{}</video:thumbnail_loc>",
        escape_text(&record.thumbnail_url)
    ));
    xml.push(format!(
        "      <video:title>{}</video:title>",
        escape_text(&record.title)
    ));
    xml.push(format!(
        "      <video:description>{}</video:description>",
        escape_text(&record.description)
    ));
    xml.push(format!(
        "      <video:content_loc>{}</video:content_loc>",
        record.id.watch_url()
    ));
    xml.push(format!(
        "      <video:player_loc>{}</video:player_loc>",
        record.id.embed_url()
    ));
    if let Some(secs) = record.duration_secs {
        xml.push(format!("      <video:duration>{secs}</video:duration>"));
    }
    if let Some(ref category) = record.category {
        xml.push(format!(
            "      <video:category>{}</video:category>",
            escape_text(category)
        ));
    }
    for tag in &record.tags {
        xml.push(format!("      <video:tag>{}</video:tag>", escape_text(tag)));
    }
    if let Some(views) = record.view_count {
        xml.push(format!(
            "      <video:view_count>{views}</video:view_count>"
        ));
    }
    // Publication date is a raw pass-through of the source value
    xml.push(format!(
        "      <video:publication_date>{}</video:publication_date>",
        record.published_at
    ));
    xml.push("      <video:family_friendly>yes</video:family_friendly>".into());
    xml.push("      <video:requires_subscription>no</video:requires_subscription>".into());
    xml.push(format!(
        "      <video:uploader info=\"{}\">{}</video:uploader>",
        site.channel_url(),
        escape_text(&site.publisher_name)
    ));
    xml.push("      <video:live>no</video:live>".into());
    xml.push("    </video:video>".into());

    xml.join("\n")
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

    fn full_record() -> VideoRecord {
        VideoRecord {
            id: VideoId::new("dQw4w9WgXcQ").unwrap(),
            title: "My Video <3 — Publisher Name".into(),
            description: "Hi & there".into(),
            thumbnail_url: "https://img.example/a.jpg".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
            duration_secs: Some(3723),
            view_count: Some(1234),
            category: Some("Science & Technology".into()),
            tags: vec!["fun".into(), "coding".into()],
        }
    }

    #[test]
    fn renders_all_elements_in_order() {
        let xml = render_fragment(&full_record(), &test_site());

        let expected_order = [
            "<video:thumbnail_loc>",
            "<video:title>",
            "<video:description>",
            "<video:content_loc>",
            "<video:player_loc>",
            "<video:duration>",
            "<video:category>",
            "<video:tag>",
            "<video:view_count>",
            "<video:publication_date>",
            "<video:family_friendly>",
            "<video:requires_subscription>",
            "<video:uploader",
            "<video:live>",
        ];
        let mut last = 0;
        for needle in expected_order {
            let pos = xml.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
            assert!(pos > last, "{needle} out of order");
            last = pos;
        }

        assert!(xml.contains("<video:duration>3723</video:duration>"));
        assert!(xml.contains("<video:view_count>1234</video:view_count>"));
        assert!(xml.contains("https://youtu.be/dQw4w9WgXcQ"));
        assert!(xml.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(xml.contains(
            "<video:uploader info=\"https://www.youtube.com/channel/UCTESTCHANNEL\">Publisher Name</video:uploader>"
        ));
    }

    #[test]
    fn escapes_free_text() {
        let xml = render_fragment(&full_record(), &test_site());
        assert!(xml.contains("<video:title>My Video &lt;3 — Publisher Name</video:title>"));
        assert!(xml.contains("<video:description>Hi &amp; there</video:description>"));
        assert!(xml.contains("<video:category>Science &amp; Technology</video:category>"));
    }

    #[test]
    fn escaping_round_trips() {
        let original = "a <b> & c";
        let escaped = escape_text(original);
        assert_eq!(escaped, "a &lt;b&gt; &amp; c");
        let unescaped = escaped
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        assert_eq!(unescaped, original);
    }

    #[test]
    fn omits_unknown_optional_fields() {
        let record = VideoRecord {
            duration_secs: None,
            view_count: None,
            category: None,
            tags: vec![],
            ..full_record()
        };
        let xml = render_fragment(&record, &test_site());
        assert!(!xml.contains("<video:duration>"));
        assert!(!xml.contains("<video:view_count>"));
        assert!(!xml.contains("<video:category>"));
        assert!(!xml.contains("<video:tag>"));
        // Required elements still present
        assert!(xml.contains("<video:publication_date>"));
        assert!(xml.contains("<video:live>no</video:live>"));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let a = render_fragment(&full_record(), &test_site());
        let b = render_fragment(&full_record(), &test_site());
        assert_eq!(a, b);
    }
}
