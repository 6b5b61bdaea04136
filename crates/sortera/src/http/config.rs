//! Client configuration.

use std::time::Duration;

/// Tunable knobs for [`ApiClient`](crate::ApiClient).
///
/// All fields are public; start from `ClientConfig::default()` and override
/// what you need.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use sortera::ClientConfig;
///
/// let config = ClientConfig {
///     request_timeout: Duration::from_secs(10),
///     ..ClientConfig::default()
/// };
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Per-call network timeout.
    pub request_timeout: Duration,
    /// Extra attempts after the first, for 429/5xx and network errors.
    pub max_retries: u32,
    /// First backoff delay; doubles on every further attempt.
    pub retry_base_delay: Duration,
    /// `batchSize` requested from list endpoints.
    pub page_size: u32,
    /// Fan-out bound for batched create and delete calls.
    pub max_concurrent_requests: usize,
    /// Poll cadence while waiting for a created resource to become visible.
    pub resource_poll_interval: Duration,
    /// How long to wait for a created resource before giving up.
    pub resource_wait_timeout: Duration,
    /// Poll cadence while waiting for a function's first trained model.
    pub model_poll_interval: Duration,
    /// How long to wait for a trained model before giving up.
    pub model_wait_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            page_size: 1000,
            max_concurrent_requests: 8,
            resource_poll_interval: Duration::from_millis(500),
            resource_wait_timeout: Duration::from_secs(5),
            model_poll_interval: Duration::from_secs(5),
            model_wait_timeout: Duration::from_secs(50),
        }
    }
}

impl ClientConfig {
    /// Backoff delay before retry number `attempt + 1`.
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.saturating_pow(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = ClientConfig {
            retry_base_delay: Duration::from_millis(100),
            ..ClientConfig::default()
        };
        assert_eq!(config.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(400));
    }
}
