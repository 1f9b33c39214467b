//! `plugin-releaser release`: the full release run.

use anyhow::{bail, Context, Result};
use releaser_core::config::ReleaserConfig;
use releaser_core::github::GithubClient;
use releaser_core::pipeline::{self, PipelineOptions};
use releaser_core::resolve::ResolveOptions;
use releaser_core::version::{resolve_tag_name, resolve_version, PROJECT_MANIFEST};
use releaser_core::ReleaseContext;
use std::path::Path;

use super::template_settings;
use crate::cli::ReleaseArgs;

pub async fn run_release(cfg: &ReleaserConfig, args: ReleaseArgs) -> Result<()> {
    let (owner, repo) = owner_and_repo(args.repository.as_deref(), args.owner, args.repo)?;
    let tag_name = resolve_tag_name(&args.git_ref.git_ref)?;
    let version = resolve_version(&tag_name, Path::new(PROJECT_MANIFEST))?;
    tracing::info!(tag = %tag_name, version = %version, "resolved release");

    let (template_file, indent) = template_settings(cfg, &args.template);
    let webhook_url = args.webhook_url.unwrap_or_else(|| cfg.webhook_url.clone());

    // Removed on drop, after the run.
    let download_dir = tempfile::Builder::new()
        .prefix("plugin-releaser-")
        .tempdir()
        .context("create download dir")?;

    let ctx = ReleaseContext {
        owner,
        repo,
        actor: args.actor,
        tag_name,
        version,
        template_file,
        indent,
        webhook_url: Some(webhook_url).filter(|u| !u.is_empty()),
        upload_checksums: args.upload_checksums,
        upload_plugin_manifest: !args.no_upload_manifest,
        download_dir: download_dir.path().to_path_buf(),
    };
    let client = GithubClient::new(cfg.api_base_url.clone(), args.token);
    let opts = PipelineOptions {
        resolve: ResolveOptions::from(cfg),
        checksums_suffix: cfg.checksums_suffix.clone(),
    };

    if args.dry_run {
        let built = pipeline::build_manifest(&ctx, &client, &opts).await?;
        print!("{}", built.rendered);
        return Ok(());
    }

    let outcome = pipeline::run_release(&ctx, &client, &opts).await?;
    for name in &outcome.uploaded {
        println!("uploaded {}", name);
    }
    if outcome.webhook_sent {
        println!("notified release bot for {}", ctx.tag_name);
    }
    Ok(())
}

/// Explicit `--owner`/`--repo` win; otherwise split `owner/repo`.
pub(crate) fn owner_and_repo(
    repository: Option<&str>,
    owner: Option<String>,
    repo: Option<String>,
) -> Result<(String, String)> {
    let (from_owner, from_repo) = match repository.and_then(|r| r.split_once('/')) {
        Some((o, r)) => (Some(o.to_string()), Some(r.to_string())),
        None => (None, None),
    };
    match (owner.or(from_owner), repo.or(from_repo)) {
        (Some(o), Some(r)) if !o.is_empty() && !r.is_empty() => Ok((o, r)),
        _ => bail!("repository owner and name required: pass --owner/--repo or --repository owner/repo (GITHUB_REPOSITORY)"),
    }
}
