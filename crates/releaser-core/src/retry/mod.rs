//! Retry and backoff policy.
//!
//! Classifies transfer errors (not-yet-published assets, timeouts, throttling,
//! connection failures) and makes exponential backoff decisions. The asset
//! resolver uses this to poll for assets that the hosting platform has not
//! finished publishing.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
