//! Blocking HTTP transfers over libcurl.
//!
//! Every call runs on the current thread; async callers wrap these in
//! `spawn_blocking`.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::retry::TransferError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Status and body of a completed transfer.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u32,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `TransferError::Http`.
    pub fn error_for_status(self) -> Result<Self, TransferError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransferError::Http(self.status))
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Request body and its content type.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    pub data: &'a [u8],
    pub content_type: &'a str,
}

/// Plain HTTP client: carries the user agent, nothing else. Credentials are
/// added per request by the caller.
#[derive(Debug, Clone)]
pub struct HttpClient {
    user_agent: String,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(format!("plugin-releaser/{}", env!("CARGO_PKG_VERSION")))
    }
}

impl HttpClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn easy(&self, url: &str, headers: &[String]) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        easy.timeout(TRANSFER_TIMEOUT)?;

        let mut list = curl::easy::List::new();
        for h in headers {
            list.append(h)?;
        }
        if !headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(easy)
    }

    /// Perform a request and collect the body in memory. Any HTTP status is
    /// returned as `Ok`; use [`Response::error_for_status`] to reject non-2xx.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[String],
        body: Option<Body<'_>>,
    ) -> Result<Response, TransferError> {
        let mut headers = headers.to_vec();
        if let Some(b) = body {
            headers.push(format!("Content-Type: {}", b.content_type));
            // No 100-continue round trip for uploads.
            headers.push("Expect:".to_string());
        }
        let mut easy = self.easy(url, &headers)?;

        match method {
            Method::Get => {}
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(body.map(|b| b.data).unwrap_or_default())?;
            }
            Method::Delete => {
                easy.custom_request("DELETE")?;
            }
        }

        let mut out = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                out.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(?method, url, status, bytes = out.len(), "http request done");
        Ok(Response { status, body: out })
    }

    /// GET `url` straight into `dest` (created or truncated). Returns bytes written.
    pub fn download_to(&self, url: &str, headers: &[String], dest: &Path) -> Result<u64, TransferError> {
        let mut file = File::create(dest)?;
        let mut written = 0u64;
        let mut write_err: Option<std::io::Error> = None;

        let mut easy = self.easy(url, headers)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    // Short write aborts the transfer.
                    Ok(0)
                }
            })?;
            if let Err(e) = transfer.perform() {
                drop(transfer);
                if let Some(io) = write_err.take() {
                    return Err(TransferError::Io(io));
                }
                return Err(TransferError::Curl(e));
            }
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(TransferError::Http(status));
        }
        file.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_for_status_rejects_non_2xx() {
        let ok = Response { status: 201, body: b"{}".to_vec() };
        assert!(ok.error_for_status().is_ok());

        let missing = Response { status: 404, body: Vec::new() };
        assert!(matches!(missing.error_for_status(), Err(TransferError::Http(404))));
    }

    #[test]
    fn default_user_agent_names_the_tool() {
        assert!(HttpClient::default().user_agent().starts_with("plugin-releaser/"));
    }

    #[test]
    fn unreachable_host_is_a_curl_error() {
        let client = HttpClient::default();
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) on localhost is closed on CI hosts.
        let err = client
            .download_to("http://127.0.0.1:9/x.tar.gz", &[], &dir.path().join("x"))
            .unwrap_err();
        assert!(matches!(err, TransferError::Curl(_)));
    }
}
