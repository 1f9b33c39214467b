//! The full release run: checksums, manifest, uploads, webhook.
//!
//! Steps run in order and the first failure ends the run, so nothing is
//! uploaded or announced for a manifest whose checksums are incomplete.

use crate::checksum::{checksums_asset_name, checksums_file, AssetChecksumMap};
use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::github::GithubClient;
use crate::manifest::{parse_manifest, Manifest, ReleaseRequest};
use crate::resolve::{resolve_checksums, ResolveOptions};
use crate::template::{self, ReleaseView, UrlWithChecksum};
use crate::webhook;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub resolve: ResolveOptions,
    /// Suffix selecting which package URLs go into the checksums file.
    pub checksums_suffix: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            checksums_suffix: ".tar.gz".to_string(),
        }
    }
}

/// Rendered manifest and what went into it.
#[derive(Debug, Clone)]
pub struct BuiltManifest {
    pub rendered: String,
    pub manifest: Manifest,
    pub checksums: AssetChecksumMap,
}

#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub built: BuiltManifest,
    /// Names of assets uploaded to the release.
    pub uploaded: Vec<String>,
    pub webhook_sent: bool,
}

/// Second pass: render with every package URL paired with its digest.
pub fn render_manifest(ctx: &ReleaseContext, checksums: &AssetChecksumMap) -> Result<String> {
    let expander = UrlWithChecksum {
        checksums,
        indent: ctx.indent,
    };
    let view = ReleaseView {
        tag_name: &ctx.tag_name,
        version: &ctx.version,
        expander: &expander,
    };
    Ok(template::render(&ctx.template_file, &view)?)
}

/// Resolve checksums and render the final manifest, without side effects on
/// the release.
pub async fn build_manifest(
    ctx: &ReleaseContext,
    client: &GithubClient,
    opts: &PipelineOptions,
) -> Result<BuiltManifest> {
    let checksums = resolve_checksums(ctx, client, &opts.resolve).await?;
    let rendered = render_manifest(ctx, &checksums)?;
    let manifest = parse_manifest(&rendered)?;
    tracing::debug!(name = %manifest.name, version = %manifest.version, "rendered manifest");
    Ok(BuiltManifest {
        rendered,
        manifest,
        checksums,
    })
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ReleaseError::Http(format!("blocking task: {}", e)))?
}

pub async fn run_release(
    ctx: &ReleaseContext,
    client: &GithubClient,
    opts: &PipelineOptions,
) -> Result<ReleaseOutcome> {
    let built = build_manifest(ctx, client, opts).await?;
    let mut uploaded = Vec::new();

    if ctx.upload_checksums || ctx.upload_plugin_manifest {
        let release = {
            let (c, owner, repo, tag) = (
                client.clone(),
                ctx.owner.clone(),
                ctx.repo.clone(),
                ctx.tag_name.clone(),
            );
            blocking(move || c.find_release_by_tag(&owner, &repo, &tag)).await?
        };
        tracing::info!(id = release.id, tag = %release.tag_name, "found release");

        let mut assets: Vec<(String, &'static str, Vec<u8>)> = Vec::new();
        if ctx.upload_checksums {
            let body = checksums_file(&built.checksums, &opts.checksums_suffix)?;
            if body.is_empty() {
                tracing::warn!(
                    suffix = %opts.checksums_suffix,
                    "no package url ends with the checksums suffix, skipping checksums upload"
                );
            } else {
                assets.push((checksums_asset_name(&ctx.tag_name), "text/plain", body.into_bytes()));
            }
        }
        if ctx.upload_plugin_manifest {
            assets.push((
                format!("{}.json", built.manifest.name),
                "application/json",
                built.rendered.clone().into_bytes(),
            ));
        }

        for (name, content_type, data) in assets {
            let (c, owner, repo, rel, asset_name) = (
                client.clone(),
                ctx.owner.clone(),
                ctx.repo.clone(),
                release.clone(),
                name.clone(),
            );
            blocking(move || {
                c.upload_release_asset(&owner, &repo, &rel, &asset_name, content_type, &data)
            })
            .await?;
            tracing::info!("added {} to release with tag {}", name, ctx.tag_name);
            uploaded.push(name);
        }
    }

    let webhook_sent = match (&ctx.webhook_url, ctx.is_canary()) {
        (_, true) => {
            tracing::info!("canary release, skipping release bot webhook");
            false
        }
        (None, false) => false,
        (Some(url), false) => {
            let request = ReleaseRequest::new(
                &ctx.tag_name,
                &built.manifest,
                &ctx.owner,
                &ctx.repo,
                &ctx.actor,
                &built.rendered,
            );
            tracing::info!("making webhook request to create PR");
            let (http, url) = (client.http().clone(), url.clone());
            blocking(move || webhook::dispatch(&http, &url, &request)).await?;
            true
        }
    };

    Ok(ReleaseOutcome {
        built,
        uploaded,
        webhook_sent,
    })
}
