//! `plugin-releaser render`: offline template render.
//!
//! Without `--checksum` this is the URL-only first pass. With checksums it
//! is the final pass, and every package URL must have one.

use anyhow::{bail, Context, Result};
use releaser_core::checksum::AssetChecksumMap;
use releaser_core::config::ReleaserConfig;
use releaser_core::manifest::parse_manifest;
use releaser_core::template::{self, ReleaseView, UrlOnly, UrlWithChecksum};
use releaser_core::version::{resolve_tag_name, resolve_version, PROJECT_MANIFEST};
use std::path::Path;

use super::template_settings;
use crate::cli::{RefArgs, TemplateArgs};

pub fn run_render(
    cfg: &ReleaserConfig,
    git_ref: &RefArgs,
    args: &TemplateArgs,
    checksums: &[String],
) -> Result<()> {
    let tag_name = resolve_tag_name(&git_ref.git_ref)?;
    let version = resolve_version(&tag_name, Path::new(PROJECT_MANIFEST))?;
    let (template_file, indent) = template_settings(cfg, args);

    let rendered = if checksums.is_empty() {
        let view = ReleaseView {
            tag_name: &tag_name,
            version: &version,
            expander: &UrlOnly,
        };
        template::render(&template_file, &view)?
    } else {
        let map = checksums
            .iter()
            .map(|arg| parse_checksum_arg(arg))
            .collect::<Result<AssetChecksumMap>>()?;
        let expander = UrlWithChecksum {
            checksums: &map,
            indent,
        };
        let view = ReleaseView {
            tag_name: &tag_name,
            version: &version,
            expander: &expander,
        };
        let rendered = template::render(&template_file, &view)?;
        parse_manifest(&rendered).context("rendered manifest")?;
        rendered
    };

    print!("{}", rendered);
    Ok(())
}

/// `URL=SHA256` → (url, lowercase digest). Splits on the last `=` so query
/// strings survive.
pub(crate) fn parse_checksum_arg(arg: &str) -> Result<(String, String)> {
    let Some((url, digest)) = arg.rsplit_once('=') else {
        bail!("expected URL=SHA256, got {:?}", arg);
    };
    if url.is_empty() {
        bail!("missing URL in {:?}", arg);
    }
    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("not a SHA-256 hex digest: {:?}", digest);
    }
    Ok((url.to_string(), digest.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_arg_splits_on_last_equals() {
        let digest = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
        let (url, sha) = parse_checksum_arg(&format!("https://e.com/a.tar.gz?x=1={}", digest)).unwrap();
        assert_eq!(url, "https://e.com/a.tar.gz?x=1");
        assert_eq!(sha, digest.to_ascii_lowercase());
    }

    #[test]
    fn checksum_arg_rejects_bad_input() {
        assert!(parse_checksum_arg("https://e.com/a.tar.gz").is_err());
        assert!(parse_checksum_arg("https://e.com/a.tar.gz=abc").is_err());
        assert!(parse_checksum_arg(&format!("={}", "0".repeat(64))).is_err());
    }
}
