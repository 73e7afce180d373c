//! Request and response types for the binary data protocol.
//!
//! Only the messages the client cores dispatch are modeled here; wire
//! encoding happens behind the [`ClusterFacade`](crate::ClusterFacade).

use reef_types::ClusterConfig;

use crate::payload::Payload;

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Coarse outcome of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The request completed successfully.
    Success,
    /// The server reported a failure.
    Failure,
    /// The request should be retried against the same or another node.
    Retry,
}

impl ResponseStatus {
    /// True only for [`ResponseStatus::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, ResponseStatus::Success)
    }
}

/// Fine-grained status codes of the binary key-value protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValueStatus {
    /// Operation succeeded.
    Success,
    /// Key not found.
    ErrNotFound,
    /// Key already exists.
    ErrExists,
    /// Value too large.
    ErrTooBig,
    /// Item not stored.
    ErrNotStored,
    /// Server temporarily busy.
    ErrBusy,
}

impl KeyValueStatus {
    /// Numeric protocol code.
    pub fn code(self) -> u16 {
        match self {
            KeyValueStatus::Success => 0x00,
            KeyValueStatus::ErrNotFound => 0x01,
            KeyValueStatus::ErrExists => 0x02,
            KeyValueStatus::ErrTooBig => 0x03,
            KeyValueStatus::ErrNotStored => 0x05,
            KeyValueStatus::ErrBusy => 0x85,
        }
    }
}

/// Per-node document state reported by an observe probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveStatus {
    /// Document is in memory but not yet on disk.
    FoundNotPersisted,
    /// Document is persisted to disk.
    FoundPersisted,
    /// Document is not present (deletion not yet persisted).
    NotFoundNotPersisted,
    /// Document deletion is persisted to disk.
    NotFoundPersisted,
    /// Document is marked deleted but still visible to metadata.
    LogicallyDeleted,
}

// ---------------------------------------------------------------------------
// Carrier config fetch
// ---------------------------------------------------------------------------

/// Fetch the current carrier config for a bucket from one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBucketConfigRequest {
    /// Bucket whose config is requested.
    pub bucket: String,
    /// Node the request is addressed to.
    pub hostname: String,
}

/// Response to a [`GetBucketConfigRequest`].
#[derive(Debug)]
pub struct GetBucketConfigResponse {
    /// Coarse outcome.
    pub status: ResponseStatus,
    /// Key-value protocol status code.
    pub kv_status: KeyValueStatus,
    /// Bucket the config belongs to.
    pub bucket: String,
    /// Raw config bytes (UTF-8 JSON). Owned by this response.
    pub content: Payload,
    /// Hostname of the node that answered.
    pub origin: String,
}

// ---------------------------------------------------------------------------
// Observe
// ---------------------------------------------------------------------------

/// Probe one node for the durability state of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveRequest {
    /// Document id.
    pub id: String,
    /// Expected CAS of the mutation being verified.
    pub cas: u64,
    /// True when addressed to the active copy, false for a replica.
    pub master: bool,
    /// Replica index (0 for the active copy).
    pub replica_index: u16,
    /// Bucket holding the document.
    pub bucket: String,
}

/// Response to an [`ObserveRequest`].
#[derive(Debug)]
pub struct ObserveResponse {
    /// Observed document state on the probed node.
    pub observe_status: ObserveStatus,
    /// CAS of the document as seen by the probed node.
    pub cas: u64,
    /// Whether this view comes from the active copy.
    pub master: bool,
    /// Response content. Not inspected further; released on receipt.
    pub content: Payload,
}

// ---------------------------------------------------------------------------
// Cluster config fetch
// ---------------------------------------------------------------------------

/// Response to a cluster config request: the current topology snapshot.
#[derive(Debug, Clone)]
pub struct GetClusterConfigResponse {
    /// Current cluster-wide configuration.
    pub config: ClusterConfig,
}
