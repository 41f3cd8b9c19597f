//! Exponential backoff with jitter for outbound provider calls.
//!
//! Transport failures, timeouts, 429 and 5xx responses are retried a
//! bounded number of times; anything else is returned immediately.

use pacer_core::{ProviderError, ProviderResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    max: Duration,
    current: Duration,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        let max = max.max(base);
        Self {
            max,
            current: base,
            jitter_ratio: 0.2,
        }
    }

    /// Delay before the next attempt. Doubles up to `max`, plus jitter.
    pub fn fail(&mut self) -> Duration {
        let delay = add_jitter(self.current, self.jitter_ratio);
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }
}

fn add_jitter(delay: Duration, ratio: f64) -> Duration {
    if !(0.0..=1.0).contains(&ratio) {
        return delay;
    }

    let jitter_ms_max = ((delay.as_millis() as f64) * ratio) as u64;
    if jitter_ms_max == 0 {
        return delay;
    }

    let jitter_ms = rand::rng().random_range(0..=jitter_ms_max);
    delay + Duration::from_millis(jitter_ms)
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub max: Duration,
}

pub fn is_retryable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Transport(_) | ProviderError::Timeout => true,
        ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
        ProviderError::Decode(_) => false,
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut backoff = Backoff::new(policy.base, policy.max);
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_retries && is_retryable(&err) => {
                attempt += 1;
                let delay = backoff.fail();
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "{} failed, retrying: {}",
                    label,
                    err
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
