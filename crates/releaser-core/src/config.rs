use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Asset availability polling parameters (optional `[poll]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of download attempts per asset (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 2.0 = 2s).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_secs: 2.0,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/plugin-releaser/config.toml`
/// (or an explicit path). Command-line flags override these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaserConfig {
    /// Spaces before the `sha256` line in rendered packages.
    pub indent: usize,
    /// Template rendered into the plugin manifest.
    pub template_file: PathBuf,
    /// Release bot endpoint notified for tagged releases. Empty disables the webhook.
    pub webhook_url: String,
    /// GitHub REST API base URL.
    pub api_base_url: String,
    /// Maximum number of asset downloads in flight.
    pub max_concurrent_downloads: usize,
    /// Only package URLs with this suffix are listed in the checksums file.
    pub checksums_suffix: String,
    /// Optional polling policy; if missing, built-in defaults are used.
    pub poll: Option<PollConfig>,
}

impl Default for ReleaserConfig {
    fn default() -> Self {
        Self {
            indent: 6,
            template_file: PathBuf::from(".spin-plugin.json.tmpl"),
            webhook_url: "https://spin-plugin-releaser.fermyon.app".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            max_concurrent_downloads: 8,
            checksums_suffix: ".tar.gz".to_string(),
            poll: None,
        }
    }
}

impl ReleaserConfig {
    /// Effective polling policy (configured section or defaults).
    pub fn poll_config(&self) -> PollConfig {
        self.poll.clone().unwrap_or_default()
    }
}

/// `$XDG_CONFIG_HOME/plugin-releaser/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(xdg_dirs
        .get_config_home()
        .join("plugin-releaser")
        .join("config.toml"))
}

/// Load configuration from `path`, or from the default location when `None`.
///
/// A missing file yields defaults; CI runners are ephemeral, so nothing is
/// written back.
pub fn load(path: Option<&Path>) -> Result<ReleaserConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    let data = match fs::read_to_string(&path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(ReleaserConfig::default());
        }
        Err(e) => return Err(e).with_context(|| format!("read config: {}", path.display())),
    };
    let cfg: ReleaserConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
