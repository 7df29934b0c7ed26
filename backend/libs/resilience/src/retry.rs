/// Retry policy with exponential backoff and jitter
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (total attempts = max_retries + 1)
    pub max_retries: u32,
    /// Base backoff duration, doubled on every attempt
    pub base_backoff: Duration,
    /// Upper bound of the additive random jitter
    pub max_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(800),
            max_jitter: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
    #[error("operation failed: {0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    /// The underlying error, whichever way the retry loop ended.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted(e) => e,
        }
    }
}

/// Deterministic part of the backoff schedule: `base * 2^attempt`.
///
/// Jitter is added separately so the schedule itself stays testable.
pub fn backoff_for_attempt(config: &RetryConfig, attempt: u32) -> Duration {
    config.base_backoff.saturating_mul(1u32 << attempt.min(16))
}

/// Execute a future with retry logic.
///
/// `should_retry` classifies errors: a `false` aborts immediately (permanent
/// failure), a `true` schedules another attempt until `max_retries` is spent.
pub async fn with_retry<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(RetryError::Aborted(e));
                }

                if attempt >= config.max_retries {
                    warn!("Max retries ({}) reached: {}", config.max_retries, e);
                    return Err(RetryError::Exhausted {
                        attempts: attempt + 1,
                        last: e,
                    });
                }

                let delay = backoff_for_attempt(config, attempt) + random_jitter(config);
                warn!(
                    "Retry attempt {}/{}, waiting {:?}: {}",
                    attempt + 1,
                    config.max_retries,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn random_jitter(config: &RetryConfig) -> Duration {
    let max = config.max_jitter.as_millis() as u64;
    if max == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..max))
}
