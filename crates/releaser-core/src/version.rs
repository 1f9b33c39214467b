//! Release tag and manifest version resolution from a git ref.

use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ReleaseError, Result};

/// Tag used for releases built from the default branch.
pub const CANARY_TAG: &str = "canary";

const TAG_REF_PREFIX: &str = "refs/tags/";
const DEFAULT_BRANCH_REF: &str = "refs/heads/main";

/// Project manifest consulted for canary versions.
pub const PROJECT_MANIFEST: &str = "Cargo.toml";

/// Maps a git ref to a release tag: `refs/tags/<tag>` yields `<tag>` verbatim
/// (slashes included), the default branch yields [`CANARY_TAG`].
pub fn resolve_tag_name(git_ref: &str) -> Result<String> {
    if let Some(tag) = git_ref.strip_prefix(TAG_REF_PREFIX) {
        return Ok(tag.to_string());
    }
    if git_ref == DEFAULT_BRANCH_REF {
        return Ok(CANARY_TAG.to_string());
    }
    Err(ReleaseError::UnrecognizedRef(git_ref.to_string()))
}

/// Version placed in the manifest `version` field.
///
/// The current time is read once here and used for both canary forms.
pub fn resolve_version(tag: &str, project_manifest: &Path) -> Result<String> {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    resolve_version_at(tag, project_manifest, epoch)
}

/// Like [`resolve_version`] with an explicit unix time in seconds.
///
/// - canary with a project manifest: `<package.version>post.<epoch>`
/// - canary without one: `canary.<epoch>`
/// - anything else: the tag coerced to `MAJOR.MINOR.PATCH`
pub fn resolve_version_at(tag: &str, project_manifest: &Path, epoch: u64) -> Result<String> {
    if tag != CANARY_TAG {
        return coerce_semver(tag).ok_or_else(|| ReleaseError::UnparseableVersion(tag.to_string()));
    }

    if !project_manifest.exists() {
        return Ok(format!("canary.{}", epoch));
    }

    let version = read_package_version(project_manifest)?;
    Ok(format!("{}post.{}", version, epoch))
}

#[derive(Debug, Deserialize)]
struct ProjectManifest {
    package: Option<PackageSection>,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    version: Option<toml::Value>,
}

fn read_package_version(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    let manifest: ProjectManifest = toml::from_str(&text)
        .map_err(|e| ReleaseError::UnparseableVersion(format!("{}: {}", path.display(), e)))?;
    match manifest.package.and_then(|p| p.version) {
        Some(toml::Value::String(v)) => Ok(v),
        _ => Err(ReleaseError::UnparseableVersion(format!(
            "{}: missing package.version",
            path.display()
        ))),
    }
}

fn coerce_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
            .expect("static regex is valid")
    })
}

/// Permissive semver coercion: the first run of up to three dot-separated
/// numbers neither preceded nor followed by a digit. Missing parts are 0;
/// anything after the patch number (pre-release, build metadata) is dropped.
/// A component longer than 16 digits is never truncated: the match falls
/// back to fewer components, or fails.
pub fn coerce_semver(input: &str) -> Option<String> {
    let caps = coerce_regex().captures(input)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let version = semver::Version::new(part(1)?, part(2)?, part(3)?);
    Some(version.to_string())
}
