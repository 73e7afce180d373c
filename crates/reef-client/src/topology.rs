//! Current cluster topology and config acceptance.

use std::sync::RwLock;

use reef_refresh::ConfigProvider;
use reef_types::{BucketConfig, ClusterConfig};
use tracing::{info, warn};

type AcceptHook = Box<dyn Fn(&str) + Send + Sync>;

/// The configuration provider: holds the current cluster snapshot and
/// accepts refreshed bucket configs proposed by the refresher.
///
/// An accepted proposal atomically replaces the bucket's config in the
/// snapshot and fires the accept hook, which the client wires to
/// `mark_untainted` so a settled topology stops its poll.
#[derive(Default)]
pub struct ClusterTopology {
    current: RwLock<ClusterConfig>,
    on_accept: RwLock<Option<AcceptHook>>,
}

impl ClusterTopology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the hook invoked with the bucket name whenever a proposal
    /// is accepted.
    pub fn set_accept_hook(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_accept.write().expect("accept hook lock poisoned") = Some(Box::new(hook));
    }

    /// Seed or replace a bucket config directly (bootstrap path).
    pub fn install_bucket(&self, config: BucketConfig) {
        self.current.write().expect("topology lock poisoned").set_bucket(config);
    }

    /// Drop a bucket from the snapshot.
    pub fn remove_bucket(&self, name: &str) {
        self.current.write().expect("topology lock poisoned").remove_bucket(name);
    }

    /// Clone of the current cluster snapshot.
    pub fn snapshot(&self) -> ClusterConfig {
        self.current.read().expect("topology lock poisoned").clone()
    }

    /// Clone of one bucket's current config.
    pub fn bucket(&self, name: &str) -> Option<BucketConfig> {
        self.current.read().expect("topology lock poisoned").bucket(name).cloned()
    }
}

impl ConfigProvider for ClusterTopology {
    fn propose_bucket_config(&self, bucket: &str, raw: &str) {
        let config = match serde_json::from_str::<BucketConfig>(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(bucket, %e, "discarding unparseable config proposal");
                return;
            }
        };
        if config.name != bucket {
            warn!(
                bucket,
                proposed = %config.name,
                "discarding config proposal for a different bucket"
            );
            return;
        }
        if config.nodes.is_empty() {
            warn!(bucket, "discarding config proposal with no nodes");
            return;
        }

        info!(
            bucket,
            nodes = config.nodes.len(),
            replicas = config.num_replicas,
            "accepted new bucket config"
        );
        self.current.write().expect("topology lock poisoned").set_bucket(config);

        if let Some(hook) = self.on_accept.read().expect("accept hook lock poisoned").as_ref() {
            hook(bucket);
        }
    }
}
