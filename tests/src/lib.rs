//! Shared test harness for reef integration tests.
//!
//! Provides topology builders and a tracing bootstrap. The scenarios
//! themselves live in `integration/`, one file per subsystem family.

use std::collections::BTreeMap;

use reef_types::{BucketConfig, ClusterConfig, KV_SERVICE, NodeInfo};

/// The raw config body used throughout the refresher scenarios.
pub const CONFIG_BODY: &str = "{\"config\": true}";

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A node exposing the binary key-value service on the standard port.
pub fn kv_node(hostname: &str) -> NodeInfo {
    NodeInfo::new(hostname, BTreeMap::from([(KV_SERVICE.to_string(), 11210)]))
}

/// A node exposing no services at all.
pub fn bare_node(hostname: &str) -> NodeInfo {
    NodeInfo::new(hostname, BTreeMap::new())
}

/// A single-node bucket on `localhost:8091`.
pub fn one_node_bucket(name: &str) -> BucketConfig {
    BucketConfig::new(name, vec![kv_node("localhost:8091")], 0)
}

/// A bucket with explicit nodes and replica count.
pub fn bucket_with(name: &str, nodes: Vec<NodeInfo>, replicas: u32) -> BucketConfig {
    BucketConfig::new(name, nodes, replicas)
}

/// A cluster snapshot holding the given bucket configs.
pub fn cluster_of(configs: impl IntoIterator<Item = BucketConfig>) -> ClusterConfig {
    let mut cluster = ClusterConfig::new();
    for config in configs {
        cluster.set_bucket(config);
    }
    cluster
}
