//! Sitemap-side pipeline stages: field normalization, fragment rendering,
//! container patching, and post-hoc validation.
//!
//! Everything up to the patcher is pure; only [`patch::patch_sitemap`] and
//! [`validate::validate_file`] touch the filesystem.

pub mod fragment;
pub mod normalize;
pub mod patch;
pub mod validate;

pub use fragment::{escape_text, render_fragment};
pub use normalize::{
    assemble_record, assemble_records, clean_description, clean_title, iso_duration_secs,
    normalize_tags, with_publisher_suffix,
};
pub use patch::{PatchOutcome, patch_sitemap, rebuild_container};
pub use validate::{Violation, validate_file, validate_str};
