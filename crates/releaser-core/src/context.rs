use std::path::PathBuf;

use crate::version::CANARY_TAG;

/// Everything a release run needs to know, resolved once up front.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub owner: String,
    pub repo: String,
    /// Account that triggered the release; forwarded to the release bot.
    pub actor: String,
    pub tag_name: String,
    pub version: String,
    pub template_file: PathBuf,
    /// Spaces before the `sha256` line of each rendered package.
    pub indent: usize,
    /// Release bot endpoint; `None` disables the webhook.
    pub webhook_url: Option<String>,
    pub upload_checksums: bool,
    pub upload_plugin_manifest: bool,
    /// Where assets are downloaded for hashing. Not cleaned up here.
    pub download_dir: PathBuf,
}

impl ReleaseContext {
    pub fn is_canary(&self) -> bool {
        self.tag_name == CANARY_TAG
    }
}
