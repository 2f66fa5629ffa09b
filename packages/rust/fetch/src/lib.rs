//! Source Fetcher: retrieves raw video metadata for the sync pipeline.
//!
//! Two modes, matching the two places the site's video list lives:
//! - [`api`] — the remote video-platform data API: channel → uploads
//!   playlist → playlist items → per-video details → category names.
//! - [`local`] — a JSON-LD `ItemList` structured-data block embedded in a
//!   local HTML page.
//!
//! Both produce a [`videosync_shared::FetchOutcome`]. Fetching only reads;
//! it never writes anything.

pub mod api;
pub mod local;

pub use api::YoutubeClient;
pub use local::fetch_from_page;
