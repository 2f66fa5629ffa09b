//! Video-platform API client (YouTube Data API v3 shape).
//!
//! The fetch is strictly ordered: channel → uploads playlist → playlist
//! items → per-video details → category names. Channel and playlist
//! failures are fatal; category-name lookups are best-effort and degrade
//! to raw ids.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use videosync_shared::{FetchOutcome, RawVideo, Result, VideoDetails, VideoId, VideoSyncError};

/// Production API base.
const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Page/batch ceiling the API enforces per call.
const PAGE_SIZE: usize = 50;

/// Per-call network timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("videosync/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Read-only client for the video-platform data API.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VideoSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch everything the sync pipeline needs for one channel.
    ///
    /// An empty uploads playlist yields an outcome with no videos; the
    /// caller decides whether that is "nothing to do" or an error.
    #[instrument(skip_all, fields(channel_id = %channel_id))]
    pub async fn fetch_channel_uploads(&self, channel_id: &str) -> Result<FetchOutcome> {
        let playlist_id = self.uploads_playlist_id(channel_id).await?;
        info!(%playlist_id, "resolved uploads playlist");

        let videos = self.playlist_items(&playlist_id).await?;
        if videos.is_empty() {
            info!("uploads playlist is empty");
            return Ok(FetchOutcome::default());
        }

        let ids: Vec<String> = videos.iter().map(|v| v.id.to_string()).collect();
        let details = self.video_details(&ids).await?;

        let category_ids: HashSet<String> = details
            .values()
            .filter_map(|d| d.category_id.clone())
            .collect();
        let categories = self.category_names(&category_ids).await;

        info!(
            videos = videos.len(),
            details = details.len(),
            categories = categories.len(),
            "channel fetch complete"
        );

        Ok(FetchOutcome {
            videos,
            details,
            categories,
        })
    }

    /// Resolve a channel to its uploads-playlist id.
    /// Fails with `NotFound` if the channel carries no uploads data.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String> {
        let url = format!("{}/channels", self.base_url);
        let response: ChannelListResponse = self
            .get_json(&url, &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details)
            .and_then(|d| d.related_playlists)
            .and_then(|p| p.uploads)
            .ok_or_else(|| {
                VideoSyncError::not_found(format!("uploads playlist for channel {channel_id}"))
            })
    }

    /// List all items of a playlist, following pagination in pages of 50.
    pub async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<RawVideo>> {
        let url = format!("{}/playlistItems", self.base_url);
        let max_results = PAGE_SIZE.to_string();
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", &max_results),
            ];
            if let Some(ref token) = page_token {
                params.push(("pageToken", token));
            }

            let page: PlaylistItemsResponse = self.get_json(&url, &params).await?;
            debug!(items = page.items.len(), "playlist page fetched");

            for item in page.items {
                let snippet = item.snippet;
                let Some(id) = VideoId::new(&snippet.resource_id.video_id) else {
                    warn!(token = %snippet.resource_id.video_id, "skipping item with invalid video token");
                    continue;
                };

                let thumbnail_url = snippet
                    .thumbnails
                    .as_ref()
                    .and_then(|t| t.high.as_ref().or(t.default.as_ref()))
                    .map(|t| t.url.clone())
                    .unwrap_or_default();

                videos.push(RawVideo {
                    id,
                    title: snippet.title,
                    description: snippet.description,
                    thumbnail_url,
                    published_at: snippet.published_at.unwrap_or_default(),
                    tags: Vec::new(),
                    category_id: None,
                });
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(videos)
    }

    /// Batch-fetch per-video details, in groups of at most 50 ids.
    pub async fn video_details(&self, ids: &[String]) -> Result<HashMap<String, VideoDetails>> {
        let url = format!("{}/videos", self.base_url);
        let mut details = HashMap::new();

        for batch in ids.chunks(PAGE_SIZE) {
            let joined = batch.join(",");
            let response: VideoListResponse = self
                .get_json(
                    &url,
                    &[
                        ("part", "contentDetails,snippet,statistics"),
                        ("id", &joined),
                    ],
                )
                .await?;

            for item in response.items {
                let snippet = item.snippet.unwrap_or_default();
                let view_count = item
                    .statistics
                    .and_then(|s| s.view_count)
                    .and_then(|v| v.parse::<u64>().ok());

                details.insert(
                    item.id,
                    VideoDetails {
                        duration_iso: item.content_details.and_then(|d| d.duration),
                        view_count,
                        category_id: snippet.category_id,
                        tags: snippet.tags,
                    },
                );
            }
        }

        Ok(details)
    }

    /// Resolve category ids to human-readable names. Best-effort: a failed
    /// batch is logged and skipped, never aborting the run.
    pub async fn category_names(&self, ids: &HashSet<String>) -> HashMap<String, String> {
        let url = format!("{}/videoCategories", self.base_url);
        let mut names = HashMap::new();

        let sorted: Vec<&String> = {
            let mut v: Vec<&String> = ids.iter().collect();
            v.sort();
            v
        };

        for batch in sorted.chunks(PAGE_SIZE) {
            let joined = batch
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");

            let result: Result<CategoryListResponse> = self
                .get_json(&url, &[("part", "snippet"), ("id", &joined)])
                .await;

            match result {
                Ok(response) => {
                    for item in response.items {
                        if let Some(title) = item.snippet.and_then(|s| s.title) {
                            names.insert(item.id, title);
                        }
                    }
                }
                Err(e) => {
                    warn!(batch = %joined, error = %e, "category lookup failed, skipping batch");
                }
            }
        }

        names
    }

    /// GET a JSON endpoint with the API key appended.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| VideoSyncError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VideoSyncError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| VideoSyncError::parse(format!("{url}: invalid response body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// API response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    resource_id: ResourceId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    thumbnails: Option<Thumbnails>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: Option<VideoContentDetails>,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    tags: Vec<String>,
    category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryListResponse {
    #[serde(default)]
    items: Vec<CategoryItem>,
}

#[derive(Debug, Deserialize)]
struct CategoryItem {
    id: String,
    snippet: Option<CategorySnippet>,
}

#[derive(Debug, Deserialize)]
struct CategorySnippet {
    title: Option<String>,
}
