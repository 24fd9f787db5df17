//! Condition polling.
//!
//! A [`Poller`] re-evaluates an async condition until it holds or a deadline
//! passes. Condition errors count as "not yet": the usual condition is
//! "element exists", which the find layer reports as an error rather than
//! `false`. The error from the latest failed attempt is kept and attached to
//! the final [`Error::WaitTimeout`].
//!
//! Each attempt is itself bounded by the transport timeout; the poller adds
//! the coarser, intent-level deadline on top.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use uia2_driver::{By, Poller};
//!
//! let poller = Poller::new(Duration::from_secs(10), Duration::from_millis(250));
//! poller
//!     .until(|| async { Ok(driver.find_element(By::id("ok")).await.is_ok()) })
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default overall timeout.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default interval between attempts.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// Poller
// ============================================================================

/// Retries a condition until success or deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    /// Overall deadline, measured from the first attempt.
    pub timeout: Duration,
    /// Sleep between attempts.
    pub interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT, DEFAULT_WAIT_INTERVAL)
    }
}

impl Poller {
    /// Creates a poller.
    #[inline]
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Polls until `condition` returns `Ok(true)`.
    ///
    /// This is a suspension point: the caller's task sleeps between
    /// attempts and never busy-spins.
    ///
    /// # Errors
    ///
    /// [`Error::WaitTimeout`] once the timeout has elapsed, carrying the
    /// last condition error if any attempt failed.
    pub async fn until<F, Fut>(&self, mut condition: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.until_some(|| {
            let attempt = condition();
            async move { attempt.await.map(|done| done.then_some(())) }
        })
        .await
    }

    /// Polls until `condition` yields a value.
    ///
    /// `Ok(None)` and `Err(_)` both mean "not yet".
    pub async fn until_some<T, F, Fut>(&self, mut condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_error: Option<Error> = None;

        loop {
            attempts = attempts.saturating_add(1);

            match condition().await {
                Ok(Some(value)) => {
                    debug!(
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Condition satisfied"
                    );
                    return Ok(value);
                }
                Ok(None) => trace!(attempts, "Condition not yet satisfied"),
                Err(e) => {
                    trace!(attempts, error = %e, "Condition attempt failed");
                    last_error = Some(e);
                }
            }

            if started.elapsed() >= self.timeout {
                debug!(
                    attempts,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Condition timed out"
                );
                return Err(Error::wait_timeout(
                    self.timeout.as_millis() as u64,
                    attempts,
                    last_error,
                ));
            }

            sleep(self.interval.min(self.timeout.saturating_sub(started.elapsed()))).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
