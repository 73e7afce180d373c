//! The client-facing entry point.

use std::sync::Arc;
use std::time::Duration;

use reef_observe::{
    BestEffortRetry, DurabilityObserver, ExponentialDelay, ObserveError, PersistTo, ReplicateTo,
};
use reef_proto::ClusterFacade;
use reef_refresh::CarrierRefresher;
use tracing::warn;

use crate::topology::ClusterTopology;

/// Tunables for a [`ClusterClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Cadence of tainted-bucket config polling.
    pub poll_interval: Duration,
    /// First-attempt observe retry delay.
    pub observe_delay_floor: Duration,
    /// Upper bound on the observe retry delay.
    pub observe_delay_ceil: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            observe_delay_floor: Duration::from_millis(10),
            observe_delay_ceil: Duration::from_millis(100),
        }
    }
}

/// Client handle owning the wired subsystems.
///
/// Construction wires the refresher's provider to the topology and the
/// topology's accept hook back to `mark_untainted`, closing the loop:
/// taint → poll → propose → accept → untaint.
pub struct ClusterClient {
    topology: Arc<ClusterTopology>,
    refresher: CarrierRefresher,
    observer: DurabilityObserver,
    config: ClientConfig,
}

impl ClusterClient {
    /// Create a client with default tunables.
    pub fn new(facade: Arc<dyn ClusterFacade>) -> Self {
        Self::with_config(facade, ClientConfig::default())
    }

    /// Create a client with explicit tunables.
    pub fn with_config(facade: Arc<dyn ClusterFacade>, config: ClientConfig) -> Self {
        let topology = Arc::new(ClusterTopology::new());
        let refresher = CarrierRefresher::with_poll_interval(facade.clone(), config.poll_interval);
        refresher.provider(topology.clone());

        let untaint = refresher.clone();
        topology.set_accept_hook(move |bucket| untaint.mark_untainted(bucket));

        let observer = DurabilityObserver::new(facade);

        Self {
            topology,
            refresher,
            observer,
            config,
        }
    }

    /// Register a bucket for refresh operations.
    pub fn open_bucket(&self, name: &str, password: &str) {
        self.refresher.register_bucket(name, password);
    }

    /// Deregister a bucket, stop its poll, and drop it from the snapshot.
    pub fn close_bucket(&self, name: &str) {
        self.refresher.deregister_bucket(name);
        self.topology.remove_bucket(name);
    }

    /// One-shot refresh of every bucket in the current snapshot.
    pub fn refresh_now(&self) {
        self.refresher.refresh(&self.topology.snapshot());
    }

    /// Flag a bucket's topology as in transition, starting its poll.
    pub fn mark_bucket_tainted(&self, name: &str) {
        match self.topology.bucket(name) {
            Some(config) => self.refresher.mark_tainted(&config),
            None => warn!(bucket = name, "cannot taint a bucket with no known config"),
        }
    }

    /// Verify durability of a mutation with the client's default backoff
    /// and best-effort probe errors.
    pub async fn observe(
        &self,
        bucket: &str,
        id: &str,
        cas: u64,
        remove: bool,
        persist_to: PersistTo,
        replicate_to: ReplicateTo,
    ) -> Result<bool, ObserveError> {
        let delay = ExponentialDelay::new(
            self.config.observe_delay_floor,
            self.config.observe_delay_ceil,
        );
        self.observer
            .observe(
                bucket,
                id,
                cas,
                remove,
                persist_to,
                replicate_to,
                &delay,
                &BestEffortRetry,
            )
            .await
    }

    /// The current topology snapshot holder.
    pub fn topology(&self) -> &Arc<ClusterTopology> {
        &self.topology
    }

    /// The underlying refresher handle.
    pub fn refresher(&self) -> &CarrierRefresher {
        &self.refresher
    }

    /// Stop all background polling.
    pub fn shutdown(&self) {
        self.refresher.shutdown();
    }
}
