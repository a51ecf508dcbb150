//! Bounded retry with exponential backoff for transient failures.

use tracing::warn;

/// Maximum backoff exponent (2^4 = 16 seconds max delay).
const MAX_BACKOFF_EXPONENT: u32 = 4;

/// Errors that distinguish transient failures from permanent ones.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Backoff delay before retry number `retry_count` (starting at 0).
pub fn retry_delay(retry_count: u32) -> std::time::Duration {
    let seconds = 2u64.pow(retry_count.min(MAX_BACKOFF_EXPONENT));
    std::time::Duration::from_secs(seconds)
}

/// Run `op` until it succeeds, fails permanently, or `max_attempts` is
/// exhausted. The final error is returned unchanged, so callers see the
/// underlying failure, and state is untouched by the failed attempts.
pub async fn with_retry<T, E>(
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                warn!(attempt, error = %e, "transient failure, retrying");
                tokio::time::sleep(retry_delay(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
