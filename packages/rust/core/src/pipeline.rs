//! The sync pipeline: one fetch pass feeding one fragment sequence into
//! every configured sitemap document.
//!
//! Strictly sequential. Each fetch step depends on the previous one's
//! output, and documents are patched one at a time; there is nothing here
//! worth parallelizing.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument};

use videosync_fetch::YoutubeClient;
use videosync_shared::{FetchOutcome, Result, SiteConfig};
use videosync_sitemap::patch::PatchOutcome;

/// Where the video metadata comes from.
#[derive(Debug, Clone)]
pub enum SyncSource {
    /// The remote video-platform API.
    Api {
        /// API credential, resolved from the environment by the caller.
        api_key: String,
    },
    /// A JSON-LD ItemList embedded in a local HTML page.
    Local {
        /// Path to the HTML page.
        page: PathBuf,
    },
}

/// Configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Metadata source.
    pub source: SyncSource,
    /// Publisher identity and container anchor.
    pub site: SiteConfig,
    /// Sitemap documents to patch, in order.
    pub sitemaps: Vec<PathBuf>,
    /// Render fragments but do not touch any file.
    pub dry_run: bool,
    /// Write `.bak` side-cars before overwriting.
    pub backup: bool,
    /// API base override (mock servers in tests).
    pub api_base_url: Option<String>,
}

/// Summary of one sync run.
#[derive(Debug)]
pub struct SyncReport {
    /// Number of video records assembled.
    pub record_count: usize,
    /// The rendered fragments, for dry-run inspection.
    pub fragments: Vec<String>,
    /// Patch outcomes, one per sitemap (empty on dry runs).
    pub patched: Vec<PatchOutcome>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each sitemap is patched.
    fn sitemap_patched(&self, path: &std::path::Path, entries: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &SyncReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn sitemap_patched(&self, _path: &std::path::Path, _entries: usize) {}
    fn done(&self, _report: &SyncReport) {}
}

/// Run the full sync pipeline.
///
/// An empty uploads playlist is "nothing to do", not an error: the run
/// completes without touching any sitemap.
#[instrument(skip_all, fields(sitemaps = config.sitemaps.len(), dry_run = config.dry_run))]
pub async fn sync(config: &SyncConfig, progress: &dyn ProgressReporter) -> Result<SyncReport> {
    let start = Instant::now();

    progress.phase("Fetching video metadata");
    let outcome = fetch(config).await?;

    if outcome.videos.is_empty() {
        info!("no videos found upstream, leaving sitemaps untouched");
        let report = SyncReport {
            record_count: 0,
            fragments: Vec::new(),
            patched: Vec::new(),
            elapsed: start.elapsed(),
        };
        progress.done(&report);
        return Ok(report);
    }

    progress.phase("Rendering sitemap fragments");
    let records = videosync_sitemap::assemble_records(&outcome, &config.site);
    let fragments: Vec<String> = records
        .iter()
        .map(|r| videosync_sitemap::render_fragment(r, &config.site))
        .collect();

    let mut patched = Vec::new();
    if !config.dry_run {
        for path in &config.sitemaps {
            progress.phase(&format!("Patching {}", path.display()));
            let outcome =
                videosync_sitemap::patch_sitemap(path, &fragments, &config.site, config.backup)?;
            progress.sitemap_patched(&outcome.path, outcome.entry_count);
            patched.push(outcome);
        }
    }

    let report = SyncReport {
        record_count: records.len(),
        fragments,
        patched,
        elapsed: start.elapsed(),
    };

    info!(
        records = report.record_count,
        sitemaps = report.patched.len(),
        dry_run = config.dry_run,
        elapsed_ms = report.elapsed.as_millis(),
        "sync complete"
    );

    progress.done(&report);
    Ok(report)
}

/// Resolve the configured source into one fetch pass.
async fn fetch(config: &SyncConfig) -> Result<FetchOutcome> {
    match &config.source {
        SyncSource::Api { api_key } => {
            let mut client = YoutubeClient::new(api_key.clone())?;
            if let Some(base) = &config.api_base_url {
                client = client.with_base_url(base.clone());
            }
            client.fetch_channel_uploads(&config.site.channel_id).await
        }
        SyncSource::Local { page } => videosync_fetch::fetch_from_page(page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_site() -> SiteConfig {
        SiteConfig {
            publisher_name: "Publisher Name".into(),
            channel_url_base: "https://www.youtube.com/channel/".into(),
            videos_url: "https://abdulkerimsesli.de/videos/".into(),
            channel_id: "UCTESTCHANNEL".into(),
        }
    }

    fn scratch_sitemaps(name: &str, count: usize) -> (PathBuf, Vec<PathBuf>) {
        let dir = std::env::temp_dir().join(format!("videosync-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        let fixture = std::fs::read_to_string("../../../fixtures/xml/sitemap.fixture.xml")
            .expect("read fixture");
        let paths: Vec<PathBuf> = (0..count)
            .map(|i| {
                let p = dir.join(format!("sitemap-{i}.xml"));
                std::fs::write(&p, &fixture).unwrap();
                p
            })
            .collect();
        (dir, paths)
    }

    #[tokio::test]
    async fn local_sync_patches_every_sitemap() {
        let (dir, sitemaps) = scratch_sitemaps("pipeline-local", 2);

        let config = SyncConfig {
            source: SyncSource::Local {
                page: PathBuf::from("../../../fixtures/html/videos-page.fixture.html"),
            },
            site: test_site(),
            sitemaps: sitemaps.clone(),
            dry_run: false,
            backup: true,

            api_base_url: None,
        };

        let report = sync(&config, &SilentProgress).await.unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(report.patched.len(), 2);

        for path in &sitemaps {
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.contains("Berlin Timelapse — Publisher Name"));
            assert!(!content.contains("Old Entry"));
            // PT3M33S from the JSON-LD duration
            assert!(content.contains("<video:duration>213</video:duration>"));
            assert!(path.with_extension("xml.bak").exists() || {
                let mut bak = path.as_os_str().to_os_string();
                bak.push(".bak");
                PathBuf::from(bak).exists()
            });
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let (dir, sitemaps) = scratch_sitemaps("pipeline-dry", 1);
        let before = std::fs::read_to_string(&sitemaps[0]).unwrap();

        let config = SyncConfig {
            source: SyncSource::Local {
                page: PathBuf::from("../../../fixtures/html/videos-page.fixture.html"),
            },
            site: test_site(),
            sitemaps: sitemaps.clone(),
            dry_run: true,
            backup: true,
            api_base_url: None,
        };

        let report = sync(&config, &SilentProgress).await.unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(report.fragments.len(), 2);
        assert!(report.patched.is_empty());

        assert_eq!(std::fs::read_to_string(&sitemaps[0]).unwrap(), before);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn api_sync_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "contentDetails": { "relatedPlaylists": { "uploads": "UUTESTUPLOADS" } }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "snippet": {
                        "resourceId": { "videoId": "dQw4w9WgXcQ" },
                        "title": "Fresh Upload",
                        "description": "From the API",
                        "thumbnails": { "high": { "url": "https://img.example/f.jpg" } },
                        "publishedAt": "2024-04-01T00:00:00Z"
                    }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "dQw4w9WgXcQ",
                    "contentDetails": { "duration": "PT1M" },
                    "snippet": { "tags": ["#fun", "FUN", "coding"], "categoryId": "28" },
                    "statistics": { "viewCount": "999" }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/videoCategories"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (dir, sitemaps) = scratch_sitemaps("pipeline-api", 1);

        let config = SyncConfig {
            source: SyncSource::Api {
                api_key: "test-key".into(),
            },
            site: test_site(),
            sitemaps: sitemaps.clone(),
            dry_run: false,
            backup: false,
            api_base_url: Some(server.uri()),
        };

        let report = sync(&config, &SilentProgress).await.unwrap();
        assert_eq!(report.record_count, 1);

        let content = std::fs::read_to_string(&sitemaps[0]).unwrap();
        assert!(content.contains("Fresh Upload — Publisher Name"));
        assert!(content.contains("<video:tag>fun</video:tag>"));
        assert!(content.contains("<video:tag>coding</video:tag>"));
        assert!(content.contains("<video:view_count>999</video:view_count>"));
        // Category lookup failed, so the raw id degrades through
        assert!(content.contains("<video:category>28</video:category>"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn empty_playlist_is_nothing_to_do() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "contentDetails": { "relatedPlaylists": { "uploads": "UUTESTUPLOADS" } }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlistItems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let (dir, sitemaps) = scratch_sitemaps("pipeline-empty", 1);
        let before = std::fs::read_to_string(&sitemaps[0]).unwrap();

        let config = SyncConfig {
            source: SyncSource::Api {
                api_key: "test-key".into(),
            },
            site: test_site(),
            sitemaps: sitemaps.clone(),
            dry_run: false,
            backup: true,
            api_base_url: Some(server.uri()),
        };

        let report = sync(&config, &SilentProgress).await.unwrap();
        assert_eq!(report.record_count, 0);
        assert!(report.patched.is_empty());
        assert_eq!(std::fs::read_to_string(&sitemaps[0]).unwrap(), before);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
