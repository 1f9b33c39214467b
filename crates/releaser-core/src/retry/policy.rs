use std::time::Duration;

use crate::config::PollConfig;

/// High-level classification of a transfer error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Asset is not published yet (404 right after the release was created).
    NotYetAvailable,
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (not retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps, used to poll for asset availability.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for RetryPolicy {
    /// Base delays that are not representable (`inf`, `1e20`) or exceed the
    /// cap are clamped to `max_delay`; NaN and negatives become zero.
    fn from(cfg: &PollConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        let base_delay = Duration::try_from_secs_f64(cfg.base_delay_secs.max(0.0))
            .unwrap_or(max_delay)
            .min(max_delay);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::NotYetAvailable
            | ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32.saturating_mul(1 << attempt.saturating_sub(1).min(8));
                let raw = self.base_delay.saturating_mul(exp);
                RetryDecision::RetryAfter(raw.min(self.max_delay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_retry_for_other() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn not_yet_available_is_polled() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::NotYetAvailable),
            RetryDecision::RetryAfter(_)
        ));
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 20;
        let d1 = match p.decide(1, ErrorKind::Timeout) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        let d2 = match p.decide(2, ErrorKind::Timeout) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        assert!(d2 >= d1);

        let d_last = match p.decide(12, ErrorKind::Timeout) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        assert!(d_last <= p.max_delay);
    }

    #[test]
    fn respects_max_attempts() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 3;
        assert!(matches!(
            p.decide(2, ErrorKind::NotYetAvailable),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::NotYetAvailable), RetryDecision::NoRetry);
    }

    #[test]
    fn none_never_retries() {
        let p = RetryPolicy::none();
        assert_eq!(p.decide(1, ErrorKind::Throttled), RetryDecision::NoRetry);
    }

    #[test]
    fn from_poll_config() {
        let cfg = PollConfig {
            max_attempts: 0,
            base_delay_secs: 0.5,
            max_delay_secs: 4,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.base_delay, Duration::from_millis(500));
        assert_eq!(p.max_delay, Duration::from_secs(4));
    }

    #[test]
    fn unrepresentable_base_delay_is_clamped() {
        for base_delay_secs in [1e20, f64::INFINITY, 90.0] {
            let cfg = PollConfig {
                max_attempts: 3,
                base_delay_secs,
                max_delay_secs: 30,
            };
            let p = RetryPolicy::from(&cfg);
            assert_eq!(p.base_delay, Duration::from_secs(30), "{}", base_delay_secs);
        }
    }

    #[test]
    fn nan_or_negative_base_delay_is_zero() {
        for base_delay_secs in [f64::NAN, -5.0] {
            let cfg = PollConfig {
                max_attempts: 3,
                base_delay_secs,
                max_delay_secs: 30,
            };
            assert_eq!(RetryPolicy::from(&cfg).base_delay, Duration::ZERO);
        }
    }
}
