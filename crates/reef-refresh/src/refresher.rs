//! Carrier config refresher: one-shot refresh and tainted-bucket polling.
//!
//! [`CarrierRefresher`] is a cheaply cloneable handle around shared state.
//! `refresh` spawns one background fetch per bucket in the given snapshot;
//! `mark_tainted` starts a periodic poll task for one bucket, guarded by a
//! per-bucket single-flight registry. Poll cancellation is observed at
//! tick boundaries only: a tick already in progress completes, no further
//! tick is scheduled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use reef_proto::{ClusterFacade, GetBucketConfigRequest, GetBucketConfigResponse};
use reef_types::{BucketConfig, ClusterConfig, NodeInfo};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::error::RefreshError;
use crate::provider::ConfigProvider;
use crate::selector::NodeSelector;

/// Default cadence for tainted-bucket polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Keeps bucket configs fresh by polling cluster nodes.
#[derive(Clone)]
pub struct CarrierRefresher {
    inner: Arc<RefresherInner>,
}

struct RefresherInner {
    facade: Arc<dyn ClusterFacade>,
    provider: RwLock<Option<Arc<dyn ConfigProvider>>>,
    /// Registered buckets, mapping name to password.
    registrations: Mutex<HashMap<String, String>>,
    /// Active tainted polls. Presence of an entry is the single-flight
    /// guard: at most one poll task per bucket.
    polls: Mutex<HashMap<String, PollHandle>>,
    poll_interval: Duration,
}

struct PollHandle {
    stop: Arc<AtomicBool>,
}

impl CarrierRefresher {
    /// Create a refresher with the default poll cadence.
    pub fn new(facade: Arc<dyn ClusterFacade>) -> Self {
        Self::with_poll_interval(facade, DEFAULT_POLL_INTERVAL)
    }

    /// Create a refresher with a custom poll cadence.
    pub fn with_poll_interval(facade: Arc<dyn ClusterFacade>, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                facade,
                provider: RwLock::new(None),
                registrations: Mutex::new(HashMap::new()),
                polls: Mutex::new(HashMap::new()),
                poll_interval,
            }),
        }
    }

    /// Install the acceptance sink for proposed configs.
    pub fn provider(&self, provider: Arc<dyn ConfigProvider>) {
        *self.inner.provider.write().expect("provider lock poisoned") = Some(provider);
    }

    /// Record a bucket for future refresh operations. Idempotent.
    pub fn register_bucket(&self, name: &str, password: &str) {
        let mut registrations = self
            .inner
            .registrations
            .lock()
            .expect("registrations lock poisoned");
        if registrations
            .insert(name.to_string(), password.to_string())
            .is_none()
        {
            debug!(bucket = name, "bucket registered");
        }
    }

    /// Remove a bucket registration and stop any active poll for it.
    pub fn deregister_bucket(&self, name: &str) {
        if self
            .inner
            .registrations
            .lock()
            .expect("registrations lock poisoned")
            .remove(name)
            .is_some()
        {
            debug!(bucket = name, "bucket deregistered");
        }
        self.mark_untainted(name);
    }

    /// True if the bucket is currently registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner
            .registrations
            .lock()
            .expect("registrations lock poisoned")
            .contains_key(name)
    }

    /// Password recorded for a registered bucket, for the transport layer
    /// to authenticate config fetches with.
    pub fn bucket_password(&self, name: &str) -> Option<String> {
        self.inner
            .registrations
            .lock()
            .expect("registrations lock poisoned")
            .get(name)
            .cloned()
    }

    /// One-shot refresh: for every bucket in the snapshot, fetch a fresh
    /// config from its KV-enabled nodes and propose it.
    ///
    /// Returns immediately; fetches run as background tasks, one per
    /// bucket. Buckets that yield no usable config fail silently.
    pub fn refresh(&self, cluster: &ClusterConfig) {
        for config in cluster.bucket_configs() {
            let inner = self.inner.clone();
            let snapshot = config.clone();
            tokio::spawn(async move {
                inner.refresh_bucket(&snapshot).await;
            });
        }
    }

    /// Start a periodic poll for a bucket whose topology is in transition.
    ///
    /// The poll runs at the configured cadence ([`DEFAULT_POLL_INTERVAL`]
    /// by default), first tick one full period after this call, until the
    /// bucket is [`mark_untainted`](Self::mark_untainted)ed. A bucket
    /// already being polled ignores further calls.
    pub fn mark_tainted(&self, config: &BucketConfig) {
        let name = config.name.clone();
        let mut polls = self.inner.polls.lock().expect("polls lock poisoned");
        if polls.contains_key(&name) {
            debug!(bucket = %name, "bucket already tainted, poll in flight");
            return;
        }

        info!(bucket = %name, "bucket tainted, starting periodic config poll");
        let stop = Arc::new(AtomicBool::new(false));
        let task_stop = stop.clone();
        let inner = self.inner.clone();
        let snapshot = config.clone();
        tokio::spawn(async move {
            let mut tick = interval_at(
                Instant::now() + inner.poll_interval,
                inner.poll_interval,
            );
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                if task_stop.load(Ordering::Acquire) {
                    break;
                }
                inner.refresh_bucket(&snapshot).await;
                if task_stop.load(Ordering::Acquire) {
                    break;
                }
            }
            debug!(bucket = %snapshot.name, "tainted poll stopped");
        });

        polls.insert(name, PollHandle { stop });
    }

    /// Stop the periodic poll for a bucket. A tick already in progress
    /// completes; no further tick is scheduled. No-op if not tainted.
    pub fn mark_untainted(&self, name: &str) {
        if let Some(handle) = self.inner.polls.lock().expect("polls lock poisoned").remove(name) {
            info!(bucket = name, "bucket untainted, stopping config poll");
            handle.stop.store(true, Ordering::Release);
        }
    }

    /// True if a periodic poll is currently active for the bucket.
    pub fn is_tainted(&self, name: &str) -> bool {
        self.inner.polls.lock().expect("polls lock poisoned").contains_key(name)
    }

    /// Stop all periodic polls. Used on client teardown.
    pub fn shutdown(&self) {
        let mut polls = self.inner.polls.lock().expect("polls lock poisoned");
        if polls.is_empty() {
            return;
        }
        info!(active_polls = polls.len(), "refresher shutting down");
        for (_, handle) in polls.drain() {
            handle.stop.store(true, Ordering::Release);
        }
    }
}

impl RefresherInner {
    /// One refresh attempt: walk the bucket's KV-enabled nodes in order
    /// and propose the first usable config. Exhaustion is silent.
    async fn refresh_bucket(&self, config: &BucketConfig) {
        for node in NodeSelector::new(config) {
            match self.fetch_from_node(&config.name, node).await {
                Ok(body) => {
                    let provider = self.provider.read().expect("provider lock poisoned").clone();
                    match provider {
                        Some(provider) => {
                            debug!(
                                bucket = %config.name,
                                origin = %node.hostname,
                                "proposing refreshed bucket config"
                            );
                            provider.propose_bucket_config(&config.name, &body);
                        }
                        None => {
                            warn!(
                                bucket = %config.name,
                                "fetched a config but no provider is installed"
                            );
                        }
                    }
                    return;
                }
                Err(e) => {
                    debug!(
                        bucket = %config.name,
                        node = %node.hostname,
                        %e,
                        "config fetch failed, trying next node"
                    );
                }
            }
        }
        debug!(bucket = %config.name, "no node yielded a usable config");
    }

    /// Fetch the config body from one node.
    ///
    /// The response payload is released on every branch: consumed and
    /// released on success, dropped (which releases) on each rejection.
    async fn fetch_from_node(
        &self,
        bucket: &str,
        node: &NodeInfo,
    ) -> Result<String, RefreshError> {
        let request = GetBucketConfigRequest {
            bucket: bucket.to_string(),
            hostname: node.hostname.clone(),
        };
        let response = self.facade.get_bucket_config(request).await?;
        let GetBucketConfigResponse {
            status,
            kv_status,
            content,
            origin,
            ..
        } = response;

        if !status.is_success() {
            return Err(RefreshError::FailureStatus {
                origin,
                status,
                code: kv_status.code(),
            });
        }
        if content.is_empty() {
            return Err(RefreshError::EmptyConfig { origin });
        }

        let body = content.as_utf8()?.to_owned();
        content.release();
        Ok(body)
    }
}
