//! # Fixed-interval retry policy
//!
//! Event delivery retries a bounded number of times with a constant pause
//! between failed attempts. With the defaults (30 attempts, 10 seconds apart)
//! a delivery gives up after 29 pauses, roughly five minutes after the first
//! attempt.

use std::time::Duration;

/// Default number of create attempts per event
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default pause between failed attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Bounded retry policy with a constant interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (at least 1)
    max_attempts: u32,
    /// Pause after every failed attempt except the last
    interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one attempt
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Total attempts allowed
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between failed attempts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pause to take after failed attempt number `attempt` (1-based)
    ///
    /// Returns `None` once the attempt budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(self.interval)
    }

    /// Time from the first attempt until the policy gives up, ignoring the
    /// duration of the attempts themselves
    pub fn worst_case_latency(&self) -> Duration {
        self.interval * (self.max_attempts - 1)
    }
}
