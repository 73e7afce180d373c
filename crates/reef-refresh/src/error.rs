//! Error types for the refresher.

use reef_proto::{FacadeError, ResponseStatus};

/// Why a single node failed to yield a usable bucket config.
///
/// These never escape the failover loop: each one is logged at `debug`
/// and the next KV-enabled node is tried. The only way a config reaches
/// the provider is a success status with a non-empty payload.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// The facade failed before a response was delivered.
    #[error("facade error: {0}")]
    Facade(#[from] FacadeError),

    /// The node answered with a non-success status.
    #[error("node {origin} answered {status:?} (kv code {code:#04x})")]
    FailureStatus {
        /// Node that answered.
        origin: String,
        /// Coarse response status.
        status: ResponseStatus,
        /// Key-value protocol status code.
        code: u16,
    },

    /// The node answered success but the config payload was empty.
    #[error("node {origin} returned an empty config payload")]
    EmptyConfig {
        /// Node that answered.
        origin: String,
    },

    /// The config payload was not valid UTF-8.
    #[error("config payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
