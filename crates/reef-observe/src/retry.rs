//! Error policy for individual observe probes.

/// Decides whether per-node failures during an observe round are
/// tolerated.
pub trait RetryStrategy: Send + Sync {
    /// When true, a failed probe is swallowed and that node simply does
    /// not contribute to the current round; when false, the failure
    /// aborts the whole operation.
    fn should_retry_observe(&self) -> bool;
}

/// Swallow per-node failures; other nodes may still satisfy the round.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestEffortRetry;

impl RetryStrategy for BestEffortRetry {
    fn should_retry_observe(&self) -> bool {
        true
    }
}

/// Propagate the first per-node failure to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFastRetry;

impl RetryStrategy for FailFastRetry {
    fn should_retry_observe(&self) -> bool {
        false
    }
}
