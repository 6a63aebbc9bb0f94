use std::future::Future;
use tracing::{debug, warn};

/// Calls `attempt` up to `max_attempts` times and returns the first value `accept` approves.
///
/// Returns `Ok(None)` when every attempt was rejected. An error from `attempt`
/// stops the loop and is handed back unchanged.
pub async fn retry_until<T, E, F, Fut, P>(max_attempts: u32, mut attempt: F, mut accept: P) -> Result<Option<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    for n in 1..=max_attempts {
        let value = attempt(n).await?;
        if accept(&value) {
            return Ok(Some(value));
        }
        debug!(attempt = n, max_attempts, "candidate rejected");
    }
    Ok(None)
}

/// Like [`retry_until`], but never fails: exhaustion and errors both yield `fallback()`.
pub async fn retry_or_else<T, E, F, Fut, P, D>(max_attempts: u32, attempt: F, accept: P, fallback: D) -> T
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
    D: FnOnce() -> T,
{
    match retry_until(max_attempts, attempt, accept).await {
        Ok(Some(v)) => v,
        Ok(None) => {
            warn!(max_attempts, "no acceptable value, using fallback");
            fallback()
        }
        Err(e) => {
            warn!(error = %e, "attempt failed, using fallback");
            fallback()
        }
    }
}
