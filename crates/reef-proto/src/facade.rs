//! The async seam between the client cores and the cluster.

use async_trait::async_trait;

use crate::error::FacadeError;
use crate::message::{
    GetBucketConfigRequest, GetBucketConfigResponse, GetClusterConfigResponse, ObserveRequest,
    ObserveResponse,
};

/// Dispatches requests to the cluster and returns their responses.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Each method resolves to at most one response; a returned error means
/// the transport failed and no response (and no content buffer) exists.
#[async_trait]
pub trait ClusterFacade: Send + Sync {
    /// Fetch the carrier config for a bucket from one node.
    async fn get_bucket_config(
        &self,
        request: GetBucketConfigRequest,
    ) -> Result<GetBucketConfigResponse, FacadeError>;

    /// Probe one node for the durability state of a document.
    async fn observe(&self, request: ObserveRequest) -> Result<ObserveResponse, FacadeError>;

    /// Fetch the current cluster-wide configuration snapshot.
    async fn get_cluster_config(&self) -> Result<GetClusterConfigResponse, FacadeError>;
}
