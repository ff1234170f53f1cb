// src/poll.rs

//! Bounded polling for eventually-consistent outcomes.
//!
//! Commitment on a distributed ledger can take several block intervals, so a
//! single query would report false negatives. Every "wait for an outcome"
//! in the harness goes through [`await_condition`]:
//!
//! - the predicate is evaluated immediately, then at each `interval` boundary
//!   measured from the first evaluation;
//! - `Ok(true)` stops polling and returns a [`PollReport`];
//! - `Ok(false)` means "not yet";
//! - `Err(_)` is a permanent failure and is returned as-is, without further
//!   attempts;
//! - once `timeout` has elapsed without success, a `PollTimeout` carrying the
//!   attempt count is returned. The last evaluation happens at the timeout
//!   boundary, so the error is never returned before `timeout` and, for
//!   predicates that resolve quickly, no later than `timeout + interval`.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};

use crate::errors::{HarnessError, Result};

/// How a successful poll went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Interval + timeout pair, as configured in the `[poll]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Re-issue a transaction every second for up to five seconds.
    pub const fn acceptance() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(5))
    }

    /// Query a transaction every five seconds for up to a minute.
    pub const fn commitment() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(60))
    }

    pub async fn await_condition<F, Fut>(&self, what: &str, predicate: F) -> Result<PollReport>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        await_condition(what, self.interval, self.timeout, predicate).await
    }
}

/// Poll `predicate` until it is satisfied, fails permanently, or `timeout`
/// elapses. `what` names the awaited outcome in logs and errors.
pub async fn await_condition<F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut predicate: F,
) -> Result<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if interval.is_zero() {
        return Err(HarnessError::ConfigError(format!(
            "poll interval for {what} must be non-zero"
        )));
    }

    let start = Instant::now();
    let deadline = start.checked_add(timeout).unwrap_or_else(far_future);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        if predicate().await? {
            let elapsed = start.elapsed();
            debug!(what, attempts, ?elapsed, "condition satisfied");
            return Ok(PollReport { attempts, elapsed });
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(what, attempts, "condition not satisfied before timeout");
            return Err(HarnessError::PollTimeout {
                what: what.to_string(),
                attempts,
                waited: now - start,
            });
        }

        let next = start
            .checked_add(interval.saturating_mul(attempts))
            .map_or(deadline, |boundary| boundary.min(deadline));
        trace!(what, attempts, "condition not yet satisfied; sleeping");
        sleep_until(next).await;
    }
}

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}
