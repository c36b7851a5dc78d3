//! Timers.
//!
//! `timeout` returns the same [`TimeoutError`] on every target so callers can
//! match on it without `cfg` noise. Native builds delegate to `tokio::time`;
//! wasm builds race the future against a `setTimeout`-backed sleep.

pub use std::time::Duration;

use std::fmt;
use std::future::Future;

/// Error returned when a deadline expires before the wrapped future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError {
    /// The deadline that was exceeded.
    pub after: Duration,
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation timed out after {} ms", self.after.as_millis())
    }
}

impl std::error::Error for TimeoutError {}

/// Sleeps for the specified duration.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Sleeps for the specified duration using the browser's `setTimeout`.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Requires `future` to complete within `duration`.
///
/// ```rust
/// use core_async::time::{timeout, Duration};
///
/// # async fn example() {
/// match timeout(Duration::from_secs(1), async { 42 }).await {
///     Ok(value) => assert_eq!(value, 42),
///     Err(err) => panic!("{err}"),
/// }
/// # }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimeoutError { after: duration })
}

/// Requires `future` to complete within `duration`.
#[cfg(target_arch = "wasm32")]
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    let deadline = sleep(duration);

    futures::pin_mut!(future);
    futures::pin_mut!(deadline);

    match futures::future::select(future, deadline).await {
        futures::future::Either::Left((output, _)) => Ok(output),
        futures::future::Either::Right(_) => Err(TimeoutError { after: duration }),
    }
}
