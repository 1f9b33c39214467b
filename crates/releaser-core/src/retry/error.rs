//! Transfer error type for retry classification.

use std::fmt;

/// Error returned by a single HTTP transfer (curl failure, HTTP status, or local I/O).
/// Used so we can classify and decide retries before converting to `ReleaseError`.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the body to disk failed. Not retried.
    Io(std::io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::Io(e) => write!(f, "io: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Io(e) => Some(e),
            TransferError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e)
    }
}
