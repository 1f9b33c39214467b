//! Asset URL helpers: filename extraction and local-path sanitization.

mod sanitize;

pub use sanitize::sanitize_filename_for_linux;

use sanitize::{truncate_on_char_boundary, NAME_MAX};

use crate::error::{ReleaseError, Result};

/// Last path segment of `url`, or `None` when the URL does not parse or its
/// path ends in `/`.
fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Filename of a release asset: the last path segment of its download URL.
///
/// # Examples
///
/// - `asset_filename("https://example.com/v1/plugin.tar.gz")` → `"plugin.tar.gz"`
/// - `asset_filename("https://example.com/v1/")` → `FilenameExtraction` error
pub fn asset_filename(url: &str) -> Result<String> {
    last_path_segment(url).ok_or_else(|| ReleaseError::FilenameExtraction(url.to_string()))
}

/// Local file name used while downloading: index-prefixed so two URLs with the
/// same last segment (different tags, same archive name) never collide.
/// The whole name, prefix included, stays within NAME_MAX bytes.
pub fn download_file_name(index: usize, url: &str) -> Result<String> {
    let name = sanitize_filename_for_linux(&asset_filename(url)?);
    if name.is_empty() {
        return Err(ReleaseError::FilenameExtraction(url.to_string()));
    }
    let prefix = format!("{}-", index);
    let budget = NAME_MAX.saturating_sub(prefix.len());
    Ok(format!("{}{}", prefix, truncate_on_char_boundary(&name, budget)))
}
