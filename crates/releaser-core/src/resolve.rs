//! Asset checksum resolution.
//!
//! Renders the template once without checksums to learn which package URLs
//! it references, then downloads and hashes every asset with at most
//! `max_concurrent` transfers in flight. All-or-nothing: the first failure
//! aborts the batch and no partial map is returned.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::checksum::{self, AssetChecksumMap};
use crate::config::ReleaserConfig;
use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::github::GithubClient;
use crate::manifest::package_urls;
use crate::retry::RetryPolicy;
use crate::template::{self, ReleaseView, UrlOnly};
use crate::url_model::download_file_name;

/// Fan-out and polling knobs for [`resolve_checksums`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub max_concurrent: usize,
    pub poll: RetryPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from(&ReleaserConfig::default())
    }
}

impl From<&ReleaserConfig> for ResolveOptions {
    fn from(cfg: &ReleaserConfig) -> Self {
        Self {
            max_concurrent: cfg.max_concurrent_downloads.max(1),
            poll: RetryPolicy::from(&cfg.poll_config()),
        }
    }
}

/// First pass: render with [`UrlOnly`] and collect package URLs in template
/// order. URLs differing only by case are kept once.
pub fn discover_package_urls(ctx: &ReleaseContext) -> Result<Vec<String>> {
    let view = ReleaseView {
        tag_name: &ctx.tag_name,
        version: &ctx.version,
        expander: &UrlOnly,
    };
    let rendered = template::render(&ctx.template_file, &view)?;
    let mut seen = HashSet::new();
    Ok(package_urls(&rendered)?
        .into_iter()
        .filter(|u| seen.insert(AssetChecksumMap::key(u)))
        .collect())
}

/// Resolve the SHA-256 of every package asset the template references.
pub async fn resolve_checksums(
    ctx: &ReleaseContext,
    client: &GithubClient,
    opts: &ResolveOptions,
) -> Result<AssetChecksumMap> {
    let urls = discover_package_urls(ctx)?;
    tracing::info!(count = urls.len(), tag = %ctx.tag_name, "resolving asset checksums");
    fetch_checksums(urls, client, &ctx.download_dir, opts).await
}

/// Download and hash `urls` concurrently into `download_dir`.
pub async fn fetch_checksums(
    urls: Vec<String>,
    client: &GithubClient,
    download_dir: &Path,
    opts: &ResolveOptions,
) -> Result<AssetChecksumMap> {
    // Name every file before launching anything so a bad URL fails the batch up front.
    let jobs: Vec<(String, PathBuf)> = urls
        .into_iter()
        .enumerate()
        .map(|(i, url)| -> Result<(String, PathBuf)> {
            let dest = download_dir.join(download_file_name(i, &url)?);
            Ok((url, dest))
        })
        .collect::<Result<_>>()?;

    let permits = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let mut set = JoinSet::new();
    for (url, dest) in jobs {
        let client = client.clone();
        let permits = Arc::clone(&permits);
        let policy = opts.poll;
        set.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| ReleaseError::resolution(&url, e))?;
            let task_url = url.clone();
            let digest = tokio::task::spawn_blocking(move || hash_asset(&client, &task_url, &dest, &policy))
                .await
                .map_err(|e| ReleaseError::resolution(&url, format!("download task: {}", e)))??;
            Ok::<_, ReleaseError>((url, digest))
        });
    }

    let mut map = AssetChecksumMap::new();
    while let Some(joined) = set.join_next().await {
        let outcome = joined
            .map_err(|e| ReleaseError::resolution("<asset task>", e))
            .and_then(|r| r);
        match outcome {
            Ok((url, digest)) => {
                tracing::info!(url = %url, sha256 = %digest, "resolved checksum");
                map.insert(&url, digest);
            }
            Err(e) => {
                set.abort_all();
                return Err(e);
            }
        }
    }
    Ok(map)
}

fn hash_asset(client: &GithubClient, url: &str, dest: &Path, policy: &RetryPolicy) -> Result<String> {
    let bytes = client
        .download_asset(url, dest, policy)
        .map_err(|e| ReleaseError::resolution(url, e))?;
    tracing::debug!(url, bytes, path = %dest.display(), "downloaded asset");
    checksum::sha256_path(dest).map_err(|e| ReleaseError::resolution(url, format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_template(dir: &Path, template: &str) -> ReleaseContext {
        let path = dir.join("plugin.json.tmpl");
        std::fs::write(&path, template).unwrap();
        ReleaseContext {
            owner: "o".into(),
            repo: "r".into(),
            actor: "a".into(),
            tag_name: "plugin/v0.0.8".into(),
            version: "0.0.8".into(),
            template_file: path,
            indent: 6,
            webhook_url: None,
            upload_checksums: false,
            upload_plugin_manifest: false,
            download_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn discovers_urls_in_template_order_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_with_template(
            dir.path(),
            r#"{"name": "p", "version": "{{Version}}", "packages": [
                { {{#addURLAndSha}}https://e.com/{{TagName}}/b.tar.gz{{/addURLAndSha}} },
                { {{#addURLAndSha}}https://e.com/{{TagName}}/a.zip{{/addURLAndSha}} },
                { {{#addURLAndSha}}https://E.com/{{TagName}}/b.tar.gz{{/addURLAndSha}} }
            ]}"#,
        );
        let urls = discover_package_urls(&ctx).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://e.com/plugin/v0.0.8/b.tar.gz".to_string(),
                "https://e.com/plugin/v0.0.8/a.zip".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_first_pass_json_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_with_template(dir.path(), "{ {{#addURLAndSha}}x{{/addURLAndSha}}");
        let err = discover_package_urls(&ctx).unwrap_err();
        assert!(matches!(err, ReleaseError::TemplateRender(_)));
    }

    #[tokio::test]
    async fn url_without_filename_fails_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let client = GithubClient::new("http://127.0.0.1:9", None);
        let err = fetch_checksums(
            vec!["https://example.com/".to_string()],
            &client,
            dir.path(),
            &ResolveOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReleaseError::FilenameExtraction(_)));
    }

    #[tokio::test]
    async fn no_urls_gives_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let client = GithubClient::new("http://127.0.0.1:9", None);
        let map = fetch_checksums(Vec::new(), &client, dir.path(), &ResolveOptions::default())
            .await
            .unwrap();
        assert!(map.is_empty());
    }
}
