// Retry logic with exponential backoff

use anyhow::{anyhow, Result};
use std::time::Duration;
use tokio::time::sleep;

use super::ApiError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Errors worth another attempt: rate limits, server faults and transport
/// failures. Other API rejections (bad key, bad request) fail immediately.
fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.is_retryable(),
        None => true,
    }
}

/// Execute a function with exponential backoff retry logic
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }
                last_error = Some(e);

                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        "Request failed (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        policy.max_attempts,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("Retry policy allowed no attempts")))
}
