//! Plugin manifest and release-bot request types.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::template::RenderError;

/// Rendered plugin manifest. Fields the release flow does not need are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin_compatibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub os: String,
    pub arch: String,
    pub url: String,
    pub sha256: String,
}

/// First-pass view of the manifest: only the package URLs matter.
#[derive(Debug, Deserialize)]
struct PackageUrls {
    #[serde(default)]
    packages: Vec<PackageUrl>,
}

#[derive(Debug, Deserialize)]
struct PackageUrl {
    url: String,
}

/// Parse the final rendered manifest.
pub fn parse_manifest(rendered: &str) -> Result<Manifest, RenderError> {
    serde_json::from_str(rendered).map_err(|e| RenderError::InvalidManifest(e.to_string()))
}

/// Package URLs from a first-pass render, in template order.
pub fn package_urls(rendered: &str) -> Result<Vec<String>, RenderError> {
    let parsed: PackageUrls =
        serde_json::from_str(rendered).map_err(|e| RenderError::InvalidManifest(e.to_string()))?;
    Ok(parsed.packages.into_iter().map(|p| p.url).collect())
}

/// Payload POSTed to the release bot for tagged releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    pub tag_name: String,
    pub plugin_name: String,
    pub plugin_repo: String,
    pub plugin_owner: String,
    pub plugin_release_actor: String,
    /// Base64 of the rendered manifest document.
    pub processed_template: String,
}

impl ReleaseRequest {
    pub fn new(
        tag_name: &str,
        manifest: &Manifest,
        owner: &str,
        repo: &str,
        actor: &str,
        rendered: &str,
    ) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            plugin_name: manifest.name.clone(),
            plugin_repo: repo.to_string(),
            plugin_owner: owner.to_string(),
            plugin_release_actor: actor.to_string(),
            processed_template: general_purpose::STANDARD.encode(rendered.as_bytes()),
        }
    }
}
