//! Application configuration for videosync.
//!
//! User config lives at `~/.videosync/videosync.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VideoSyncError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "videosync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".videosync";

// ---------------------------------------------------------------------------
// Config structs (matching videosync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Publisher/site identity.
    #[serde(default)]
    pub site: SiteSection,

    /// Video platform settings.
    #[serde(default)]
    pub youtube: YoutubeConfig,

    /// Sync target settings.
    #[serde(default)]
    pub sync: SyncSection,
}

/// `[site]` section — the publisher identity stamped into every fragment
/// and the canonical URL anchoring the container block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSection {
    /// Publisher name appended to titles and emitted in the uploader element.
    #[serde(default = "default_publisher_name")]
    pub publisher_name: String,

    /// Base URL for channel-profile links (channel id is appended).
    #[serde(default = "default_channel_url_base")]
    pub channel_url_base: String,

    /// Canonical URL of the videos page; identifies the container block.
    #[serde(default = "default_videos_url")]
    pub videos_url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            publisher_name: default_publisher_name(),
            channel_url_base: default_channel_url_base(),
            videos_url: default_videos_url(),
        }
    }
}

fn default_publisher_name() -> String {
    "Abdulkerim Berlin".into()
}
fn default_channel_url_base() -> String {
    "https://www.youtube.com/channel/".into()
}
fn default_videos_url() -> String {
    "https://abdulkerimsesli.de/videos/".into()
}

/// `[youtube]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default channel to sync from.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            channel_id: default_channel_id(),
        }
    }
}

fn default_api_key_env() -> String {
    "YT_API_KEY".into()
}
fn default_channel_id() -> String {
    "UCTGRherjM4iuIn86xxubuPg".into()
}

/// `[sync]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    /// Sitemap documents to patch, in order.
    #[serde(default = "default_sitemaps")]
    pub sitemaps: Vec<String>,

    /// HTML page holding the JSON-LD ItemList for local-mode syncs.
    #[serde(default = "default_local_page")]
    pub local_page: String,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            sitemaps: default_sitemaps(),
            local_page: default_local_page(),
        }
    }
}

fn default_sitemaps() -> Vec<String> {
    vec!["sitemap.xml".into(), "sitemap-videos.xml".into()]
}
fn default_local_page() -> String {
    "pages/videos/index.html".into()
}

// ---------------------------------------------------------------------------
// Site config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime site identity passed explicitly into the builder and patcher,
/// so the pipeline stays testable with alternate publishers.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Publisher name for title suffixes and the uploader element.
    pub publisher_name: String,
    /// Base URL for channel-profile links.
    pub channel_url_base: String,
    /// Canonical URL anchoring the container block.
    pub videos_url: String,
    /// Channel the uploads belong to.
    pub channel_id: String,
}

impl SiteConfig {
    /// Channel-profile URL for the uploader element's `info` attribute.
    pub fn channel_url(&self) -> String {
        format!("{}{}", self.channel_url_base, self.channel_id)
    }
}

impl From<&AppConfig> for SiteConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            publisher_name: config.site.publisher_name.clone(),
            channel_url_base: config.site.channel_url_base.clone(),
            videos_url: config.site.videos_url.clone(),
            channel_id: config.youtube.channel_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.videosync/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| VideoSyncError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.videosync/videosync.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VideoSyncError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| VideoSyncError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| VideoSyncError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| VideoSyncError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| VideoSyncError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in the config.
/// Fails with a config error when unset or empty — api-mode syncs must not
/// start without a credential.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.youtube.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(VideoSyncError::config(format!(
            "video platform API key not found. Set the {var_name} environment variable."
        ))),
    }
}
