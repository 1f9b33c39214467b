//! CLI for plugin-releaser.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use releaser_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_man, run_release, run_render, run_version};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "plugin-releaser", version)]
#[command(
    about = "Publish a Spin plugin release: asset checksums, plugin manifest and release bot notification",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/plugin-releaser/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Git ref the run was triggered by.
#[derive(Debug, Clone, Args)]
pub struct RefArgs {
    /// `refs/tags/<tag>` for a tagged release, `refs/heads/main` for canary.
    #[arg(long = "ref", env = "GITHUB_REF", value_name = "REF")]
    pub git_ref: String,
}

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Manifest template (default from config: .spin-plugin.json.tmpl).
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Spaces before each rendered `sha256` line (default from config: 6).
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub git_ref: RefArgs,

    #[command(flatten)]
    pub template: TemplateArgs,

    /// Repository as `owner/repo`; split when --owner/--repo are not given.
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long)]
    pub repo: Option<String>,

    /// Account credited with the release.
    #[arg(long, env = "GITHUB_ACTOR", default_value = "")]
    pub actor: String,

    /// GitHub token for release lookup, uploads and private asset downloads.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Release bot endpoint; an empty value disables the webhook.
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Upload `checksums-<tag>.txt` to the release.
    #[arg(long)]
    pub upload_checksums: bool,

    /// Do not upload `<plugin>.json` to the release.
    #[arg(long)]
    pub no_upload_manifest: bool,

    /// Resolve checksums and print the manifest; no uploads, no webhook.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve checksums, render the manifest, upload and notify the release bot.
    Release(ReleaseArgs),

    /// Render the template offline, URL-only or with the given checksums.
    Render {
        #[command(flatten)]
        git_ref: RefArgs,

        #[command(flatten)]
        template: TemplateArgs,

        /// Known checksum for a package URL; repeatable.
        #[arg(long = "checksum", value_name = "URL=SHA256")]
        checksums: Vec<String>,
    },

    /// Print the release tag and manifest version for a ref.
    Version {
        #[command(flatten)]
        git_ref: RefArgs,
    },

    /// Compute SHA-256 of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },

    /// Print the man page to stdout.
    Man,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Release(args) => run_release(&cfg, args).await?,
            CliCommand::Render {
                git_ref,
                template,
                checksums,
            } => run_render(&cfg, &git_ref, &template, &checksums)?,
            CliCommand::Version { git_ref } => run_version(&git_ref)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
