//! The release view and its two package-URL expanders.

use super::{Expander, NestedRender, RenderError, View};
use crate::checksum::AssetChecksumMap;

/// Section name templates use around package download URLs.
pub const EXPANDER_SECTION: &str = "addURLAndSha";

/// First pass: emits only the `url` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlOnly;

impl Expander for UrlOnly {
    fn expand(&self, raw: &str, render: &NestedRender<'_>) -> Result<String, RenderError> {
        let url = render(raw)?;
        Ok(format!("\"url\": \"{}\"", url.trim()))
    }
}

/// Second pass: emits `url` and `sha256`, the checksum line indented by
/// `indent` spaces. A URL without a resolved digest is an error.
#[derive(Debug, Clone, Copy)]
pub struct UrlWithChecksum<'a> {
    pub checksums: &'a AssetChecksumMap,
    pub indent: usize,
}

impl Expander for UrlWithChecksum<'_> {
    fn expand(&self, raw: &str, render: &NestedRender<'_>) -> Result<String, RenderError> {
        let rendered = render(raw)?;
        let url = rendered.trim();
        let digest = self
            .checksums
            .get(url)
            .ok_or_else(|| RenderError::MissingChecksum(url.to_string()))?;
        Ok(format!(
            "\"url\": \"{}\",\n{}\"sha256\": \"{}\"",
            url,
            " ".repeat(self.indent),
            digest
        ))
    }
}

/// `TagName`, `Version` and the package-URL expander.
pub struct ReleaseView<'a> {
    pub tag_name: &'a str,
    pub version: &'a str,
    pub expander: &'a dyn Expander,
}

impl View for ReleaseView<'_> {
    fn value(&self, name: &str) -> Option<String> {
        match name {
            "TagName" => Some(self.tag_name.to_string()),
            "Version" => Some(self.version.to_string()),
            _ => None,
        }
    }

    fn expander(&self, name: &str) -> Option<&dyn Expander> {
        (name == EXPANDER_SECTION).then_some(self.expander)
    }
}
