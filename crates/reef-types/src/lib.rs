//! Shared topology types for the reef cluster client.
//!
//! This crate defines the data model consumed by both client cores:
//! node descriptions ([`NodeInfo`]), per-bucket topology snapshots
//! ([`BucketConfig`]), and the cluster-wide view ([`ClusterConfig`]).
//!
//! Configs are treated as immutable snapshots: a new [`BucketConfig`]
//! replaces the previous one atomically when accepted, it is never
//! mutated in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Service tag under which a node advertises its binary key-value port.
///
/// A node that does not carry this tag in its service map cannot serve
/// data requests and is skipped by the refresher and the observer.
pub const KV_SERVICE: &str = "direct";

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Description of a single cluster node as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Hostname (and management port) of the node, e.g. `"10.0.0.1:8091"`.
    pub hostname: String,
    /// Exposed services, mapping service tag to port.
    pub services: BTreeMap<String, u16>,
}

impl NodeInfo {
    /// Create a node with the given hostname and service map.
    pub fn new(hostname: impl Into<String>, services: BTreeMap<String, u16>) -> Self {
        Self {
            hostname: hostname.into(),
            services,
        }
    }

    /// True if this node exposes the binary key-value service.
    pub fn has_kv_service(&self) -> bool {
        self.services.contains_key(KV_SERVICE)
    }

    /// Port of the binary key-value service, if exposed.
    pub fn kv_port(&self) -> Option<u16> {
        self.services.get(KV_SERVICE).copied()
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// Immutable topology snapshot for one named bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Bucket name.
    pub name: String,
    /// Nodes serving this bucket, in server-reported order.
    pub nodes: Vec<NodeInfo>,
    /// Number of replicas configured for this bucket.
    #[serde(default)]
    pub num_replicas: u32,
}

impl BucketConfig {
    /// Create a bucket config snapshot.
    pub fn new(name: impl Into<String>, nodes: Vec<NodeInfo>, num_replicas: u32) -> Self {
        Self {
            name: name.into(),
            nodes,
            num_replicas,
        }
    }
}

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// Read-only snapshot of the cluster: one [`BucketConfig`] per open bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    buckets: BTreeMap<String, BucketConfig>,
}

impl ClusterConfig {
    /// Create an empty cluster config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the config snapshot for one bucket.
    pub fn set_bucket(&mut self, config: BucketConfig) {
        self.buckets.insert(config.name.clone(), config);
    }

    /// Remove the config snapshot for one bucket.
    pub fn remove_bucket(&mut self, name: &str) -> Option<BucketConfig> {
        self.buckets.remove(name)
    }

    /// Look up the current config for a bucket.
    pub fn bucket(&self, name: &str) -> Option<&BucketConfig> {
        self.buckets.get(name)
    }

    /// Iterate over all bucket configs, ordered by bucket name.
    pub fn bucket_configs(&self) -> impl Iterator<Item = &BucketConfig> {
        self.buckets.values()
    }

    /// Number of buckets in this snapshot.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True if no buckets are present.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
