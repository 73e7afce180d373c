//! Error type for the cluster facade seam.

/// Errors surfaced by a [`ClusterFacade`](crate::ClusterFacade)
/// implementation when a request cannot produce a response.
///
/// When a facade call errors, no response was delivered and therefore no
/// content buffer exists on the caller's side.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// The underlying transport failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the transport deadline.
    #[error("request timed out")]
    Timeout,

    /// The facade has been shut down.
    #[error("facade is shut down")]
    Closed,
}
