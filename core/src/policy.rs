//! Retry policy for a logical call.

use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// How many physical attempts a call may make and how long each may take.
///
/// Backoff is linear: after failed attempt `k` the client waits
/// `base_delay * k` before attempt `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    pub base_delay: Duration,
    pub per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            per_attempt_timeout: DEFAULT_PER_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration, per_attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            per_attempt_timeout,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn single_attempt(per_attempt_timeout: Duration) -> Self {
        Self::new(1, Duration::ZERO, per_attempt_timeout)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_per_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.per_attempt_timeout = timeout;
        self
    }

    /// Delay to wait after `failed_attempt` fails, before the next one.
    pub fn backoff_after(&self, failed_attempt: u32) -> Duration {
        self.base_delay.saturating_mul(failed_attempt)
    }
}
