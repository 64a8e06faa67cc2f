// ============================================
// HAPPYHOUR - Chat Retry with Exponential Backoff
// ============================================

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = base_delay.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

/// Classify an error by its rendered message chain
pub fn is_retryable_error(error: &anyhow::Error) -> RetryDecision {
    let error_str = format!("{:#}", error).to_lowercase();

    let permanent_patterns = [
        "api key",
        "unauthorized",
        "401",
        "403",
        "400",
        "404",
        "invalid request",
    ];
    if permanent_patterns.iter().any(|p| error_str.contains(p)) {
        return RetryDecision::NoRetry;
    }

    let retryable_patterns = [
        "timeout",
        "timed out",
        "rate limit",
        "429",
        "500",
        "502",
        "503",
        "504",
        "connection refused",
        "connection reset",
        "overloaded",
    ];
    if retryable_patterns.iter().any(|p| error_str.contains(p)) {
        return RetryDecision::Retry;
    }

    RetryDecision::NoRetry
}

/// Execute an async operation, retrying transient failures
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: F) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= config.max_retries
                    || is_retryable_error(&e) == RetryDecision::NoRetry
                {
                    return Err(e);
                }
                let delay = config.delay_for_attempt(attempt);
                tracing::warn!(
                    "Attempt {} failed: {:#}. Retrying in {:?}...",
                    attempt + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(15),
            ..Default::default()
        };
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(15));
    }

    #[test]
    fn test_retryable_error_detection() {
        let timeout_err = anyhow::anyhow!("Request timeout after 30s");
        assert_eq!(is_retryable_error(&timeout_err), RetryDecision::Retry);

        let rate_limit_err = anyhow::anyhow!("Chat API error (429 Too Many Requests)");
        assert_eq!(is_retryable_error(&rate_limit_err), RetryDecision::Retry);

        let auth_err = anyhow::anyhow!("Chat API error (401 Unauthorized): invalid api key");
        assert_eq!(is_retryable_error(&auth_err), RetryDecision::NoRetry);

        let unknown = anyhow::anyhow!("Chat completion response has no message content");
        assert_eq!(is_retryable_error(&unknown), RetryDecision::NoRetry);
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let config = RetryConfig::default();
        let result = with_retry(&config, || async { Ok::<_, anyhow::Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_no_retry_config_tries_once() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 0,
            ..Default::default()
        };
        let result: anyhow::Result<()> = with_retry(&config, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("503 overloaded")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
