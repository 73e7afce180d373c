//! Backoff schedules for observe polling.

use std::time::Duration;

/// Computes the pause between observe attempts.
pub trait Delay: Send + Sync {
    /// Delay before the given retry attempt. Attempts start at 1 and
    /// increase monotonically.
    fn calculate(&self, attempt: u32) -> Duration;
}

/// Constant delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Create a fixed schedule.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Delay for FixedDelay {
    fn calculate(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Doubling delay, starting at `lower` and capped at `upper`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialDelay {
    lower: Duration,
    upper: Duration,
}

impl ExponentialDelay {
    /// Create an exponential schedule growing from `lower` to `upper`.
    pub fn new(lower: Duration, upper: Duration) -> Self {
        Self { lower, upper }
    }
}

impl Delay for ExponentialDelay {
    fn calculate(&self, attempt: u32) -> Duration {
        // lower * 2^(attempt - 1), saturating well before the shift can
        // overflow, capped at upper.
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 1u32 << exponent;
        self.lower.saturating_mul(factor).min(self.upper)
    }
}
