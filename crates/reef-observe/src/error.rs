//! Error types for the observer.

use reef_proto::FacadeError;

/// Errors that can abort a durability observation.
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    /// The CAS on the active node changed, indicating the document was
    /// modified after the mutation being verified.
    #[error("document {id} was concurrently modified on the active node")]
    ConcurrentlyModified {
        /// Observed document id.
        id: String,
    },

    /// The durability criterion demands more replicas than the bucket
    /// has configured.
    #[error(
        "not enough replicas configured on bucket {bucket}: criterion needs {needed}, bucket has {configured}"
    )]
    ReplicaNotConfigured {
        /// Bucket the observation targets.
        bucket: String,
        /// Replicas the criterion requires.
        needed: u32,
        /// Replicas the bucket has configured.
        configured: u32,
    },

    /// The bucket is missing from the current cluster config snapshot.
    #[error("bucket {0} is not present in the cluster config")]
    UnknownBucket(String),

    /// A facade request failed and the retry strategy does not swallow
    /// per-node errors.
    #[error("facade error: {0}")]
    Facade(#[from] FacadeError),
}
