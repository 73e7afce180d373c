//! Acceptance sink for proposed bucket configs.

use std::sync::Mutex;

/// Sink that accepts refreshed bucket configs.
///
/// Implementations decide what an accepted proposal means — typically
/// decoding the body and swapping the current topology snapshot. Must be
/// thread-safe: proposals arrive from background poll tasks.
pub trait ConfigProvider: Send + Sync {
    /// Propose a freshly fetched config body (UTF-8 JSON) for a bucket.
    fn propose_bucket_config(&self, bucket: &str, raw: &str);
}

/// Provider that records every proposal it receives.
///
/// Mainly for tests: lets callers assert exactly which configs were
/// proposed, and how often.
#[derive(Debug, Default)]
pub struct RecordingProvider {
    proposals: Mutex<Vec<(String, String)>>,
}

impl RecordingProvider {
    /// Create an empty recording provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(bucket, body)` proposals received so far, in order.
    pub fn proposals(&self) -> Vec<(String, String)> {
        self.proposals.lock().unwrap().clone()
    }

    /// Number of proposals received so far.
    pub fn proposal_count(&self) -> usize {
        self.proposals.lock().unwrap().len()
    }
}

impl ConfigProvider for RecordingProvider {
    fn propose_bucket_config(&self, bucket: &str, raw: &str) {
        self.proposals
            .lock()
            .unwrap()
            .push((bucket.to_string(), raw.to_string()));
    }
}
