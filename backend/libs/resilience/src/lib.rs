/// Resilience patterns for upstream HTTP calls
///
/// Provides retry with exponential backoff and jitter for transient
/// upstream failures (rate limiting, 5xx flapping).
///
/// # Example
///
/// ```rust,no_run
/// use resilience::{with_retry, RetryConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = RetryConfig::default();
///
///     let result = with_retry(&config, |_e: &String| true, || async {
///         // Your HTTP call here
///         Ok::<_, String>(())
///     })
///     .await;
/// }
/// ```
pub mod retry;

pub use retry::{backoff_for_attempt, with_retry, RetryConfig, RetryError};
