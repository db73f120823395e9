use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry Strategy
// ============================================================================
//
// Caller-side retries for data service calls. The domain layer never retries;
// a session decides per call whether a failure is worth another attempt.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, for calls whose failure should surface immediately
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded
    Success(T),
    /// Operation failed after all retries
    Failed(E),
    /// Operation permanently failed (should not retry)
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed(error) | RetryResult::PermanentFailure(error) => Err(error),
        }
    }
}

/// Check if an error is transient (should retry) or permanent (should not retry)
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Retry every failure with exponential backoff
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    label: &str,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    run(config, label, operation, |_| true).await
}

/// Retry transient failures only; permanent ones return at once
pub async fn retry_on_transient<F, Fut, T, E>(
    config: &RetryConfig,
    label: &str,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    run(config, label, operation, |error: &E| error.is_transient()).await
}

async fn run<F, Fut, T, E, R>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
    retryable: R,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        tracing::debug!(
            operation = label,
            attempt,
            max_attempts = config.max_attempts,
            "Calling data service"
        );

        let error = match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(operation = label, attempt, "Call succeeded after retry");
                }
                return RetryResult::Success(result);
            }
            Err(error) => error,
        };

        if !retryable(&error) {
            tracing::error!(operation = label, error = %error, "Permanent failure, not retrying");
            return RetryResult::PermanentFailure(error);
        }

        if attempt >= config.max_attempts {
            tracing::error!(
                operation = label,
                attempt,
                error = %error,
                "Call failed after all attempts"
            );
            return RetryResult::Failed(error);
        }

        let delay = config.delay_after(attempt);
        tracing::warn!(
            operation = label,
            attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Call failed, retrying after delay"
        );

        sleep(delay).await;
    }
}
