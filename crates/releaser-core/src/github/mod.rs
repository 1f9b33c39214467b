//! GitHub REST client for release lookup, asset upload and asset download.
//!
//! Built explicitly from an API base URL and an optional token and passed to
//! whatever needs it.

mod types;

pub use types::{Release, ReleaseAsset};

use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::http::{Body, HttpClient, Method};
use crate::retry::{run_with_retry, RetryPolicy, TransferError};

const PER_PAGE: usize = 100;

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: HttpClient,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: HttpClient::default(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn headers(&self, accept: &str) -> Vec<String> {
        let mut h = vec![format!("Accept: {}", accept)];
        if let Some(t) = &self.token {
            h.push(format!("Authorization: token {}", t));
        }
        h
    }

    fn api_get(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .request(Method::Get, url, &self.headers("application/vnd.github+json"), None)
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReleaseError::Http(format!("GET {}: {}", url, e)))?;
        Ok(resp.body)
    }

    /// Walks the release listing page by page until a release tagged `tag`
    /// shows up. Stops at the first empty or short page.
    pub fn find_release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        let mut page = 1usize;
        loop {
            let url = format!(
                "{}/repos/{}/{}/releases?per_page={}&page={}",
                self.api_base, owner, repo, PER_PAGE, page
            );
            let releases: Vec<Release> = serde_json::from_slice(&self.api_get(&url)?)?;
            tracing::debug!(page, count = releases.len(), "listed releases");

            let last_page = releases.len() < PER_PAGE;
            if let Some(release) = releases.into_iter().find(|r| r.tag_name == tag) {
                return Ok(release);
            }
            if last_page {
                return Err(ReleaseError::resolution(
                    format!("{}/{}", owner, repo),
                    format!("no release found with tag {}", tag),
                ));
            }
            page += 1;
        }
    }

    pub fn delete_release_asset(&self, owner: &str, repo: &str, asset_id: u64) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/releases/assets/{}",
            self.api_base, owner, repo, asset_id
        );
        self.http
            .request(Method::Delete, &url, &self.headers("application/vnd.github+json"), None)
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReleaseError::Http(format!("DELETE {}: {}", url, e)))?;
        Ok(())
    }

    /// Uploads `data` as asset `name`, replacing an existing asset of that
    /// name (canary releases are re-published on every push).
    pub fn upload_release_asset(
        &self,
        owner: &str,
        repo: &str,
        release: &Release,
        name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<ReleaseAsset> {
        if let Some(existing) = release.asset_named(name) {
            tracing::info!(asset = name, id = existing.id, "replacing existing release asset");
            self.delete_release_asset(owner, repo, existing.id)?;
        }

        let url = release.asset_upload_url(name);
        let resp = self
            .http
            .request(
                Method::Post,
                &url,
                &self.headers("application/vnd.github+json"),
                Some(Body { data, content_type }),
            )
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReleaseError::Http(format!("upload {}: {}", name, e)))?;
        Ok(serde_json::from_slice(&resp.body)?)
    }

    /// Downloads a release asset to `dest`, polling under `policy` while the
    /// asset is not yet available. Blocking.
    pub fn download_asset(&self, url: &str, dest: &Path, policy: &RetryPolicy) -> Result<u64, TransferError> {
        let headers = self.headers("application/octet-stream");
        run_with_retry(policy, || self.http.download_to(url, &headers, dest))
    }
}
