//! Backoff controller
//!
//! Retries requests whose data the remote side has not finished computing.
//! Only `Readiness::Pending` is retried; every error is returned as-is on the
//! first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::domain::ports::{CollectorEvent, CollectorEvents, Readiness};
use crate::error::CollectError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded exponential retry policy for "not ready yet" responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl Backoff {
    /// `max_attempts` counts every request, including the first one
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `attempt`-th pending response (zero based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `op` until it is ready, sleeping between pending responses
    ///
    /// Returns `CollectError::UnreadyExhausted` once `max_attempts` requests
    /// all came back pending. No sleep follows the final attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        events: &dyn CollectorEvents,
        mut op: F,
    ) -> Result<T, CollectError>
    where
        E: Into<CollectError>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Readiness<T>, E>>,
    {
        let mut attempt = 0;
        loop {
            let reason = match op().await.map_err(Into::into)? {
                Readiness::Ready(value) => return Ok(value),
                Readiness::Pending(reason) => reason,
            };

            if attempt + 1 >= self.max_attempts {
                return Err(CollectError::UnreadyExhausted {
                    label: label.to_string(),
                    attempts: self.max_attempts,
                });
            }

            let delay = self.delay_for(attempt);
            events.record(CollectorEvent::RetryScheduled {
                label: label.to_string(),
                attempt: attempt + 1,
                reason,
                delay,
            });
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
