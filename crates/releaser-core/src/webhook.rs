//! Release bot notification.

use crate::error::{ReleaseError, Result};
use crate::http::{Body, HttpClient, Method};
use crate::manifest::ReleaseRequest;

/// POST `request` as JSON to the release bot. Non-2xx is an error.
/// Blocking.
pub fn dispatch(client: &HttpClient, webhook_url: &str, request: &ReleaseRequest) -> Result<()> {
    let payload = serde_json::to_vec(request)?;
    tracing::debug!(url = webhook_url, tag = %request.tag_name, "dispatching release request");
    let resp = client
        .request(
            Method::Post,
            webhook_url,
            &["Accept: application/json".to_string()],
            Some(Body {
                data: &payload,
                content_type: "application/json",
            }),
        )
        .map_err(|e| ReleaseError::Http(format!("webhook {}: {}", webhook_url, e)))?;
    if !resp.is_success() {
        return Err(ReleaseError::Http(format!(
            "webhook {} returned HTTP {}: {}",
            webhook_url,
            resp.status,
            resp.text().trim()
        )));
    }
    Ok(())
}
