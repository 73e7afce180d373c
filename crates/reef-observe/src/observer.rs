//! Repeat-until-satisfied durability polling.
//!
//! [`DurabilityObserver::observe`] fans one probe out to the active copy
//! (and one per replica when the criterion touches replicas), folds the
//! responses into an [`ObserveItem`] in completion order, and resolves
//! `true` at the first aggregate that satisfies the criterion. Unsatisfied
//! rounds repeat after a [`Delay`]-scheduled pause. A probe error under a
//! non-retrying [`RetryStrategy`] is deferred until the round's remaining
//! probes have drained — a satisfying response still wins the round — and
//! propagates only once the round ends unsatisfied. The loop never gives
//! up on its own; callers bound it by dropping the future (in-flight
//! probes are then dropped too, releasing their buffers).

use std::sync::Arc;

use reef_proto::{ClusterFacade, FacadeError, ObserveRequest, ObserveResponse, ObserveStatus};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::criteria::{PersistTo, ReplicateTo};
use crate::delay::Delay;
use crate::error::ObserveError;
use crate::item::ObserveItem;
use crate::retry::RetryStrategy;

/// Verifies mutation durability by polling master and replica nodes.
pub struct DurabilityObserver {
    facade: Arc<dyn ClusterFacade>,
}

/// Statuses that signal the watched state, selected per operation kind:
/// a deletion is confirmed by not-found statuses, a mutation by found
/// statuses.
fn sentinels(remove: bool) -> (ObserveStatus, ObserveStatus) {
    if remove {
        (
            ObserveStatus::NotFoundPersisted,
            ObserveStatus::NotFoundNotPersisted,
        )
    } else {
        (
            ObserveStatus::FoundPersisted,
            ObserveStatus::FoundNotPersisted,
        )
    }
}

impl DurabilityObserver {
    /// Create an observer dispatching through the given facade.
    pub fn new(facade: Arc<dyn ClusterFacade>) -> Self {
        Self { facade }
    }

    /// Poll until the mutation identified by `id`/`cas` satisfies the
    /// durability criterion, then resolve `true`.
    ///
    /// Fails with [`ObserveError::ConcurrentlyModified`] if the active
    /// copy reports a different CAS, and with
    /// [`ObserveError::ReplicaNotConfigured`] if the criterion exceeds
    /// the bucket's replica count.
    #[allow(clippy::too_many_arguments)]
    pub async fn observe(
        &self,
        bucket: &str,
        id: &str,
        cas: u64,
        remove: bool,
        persist_to: PersistTo,
        replicate_to: ReplicateTo,
        delay: &dyn Delay,
        retry: &dyn RetryStrategy,
    ) -> Result<bool, ObserveError> {
        let (persist_identifier, replica_identifier) = sentinels(remove);

        // The aggregation seed is checked before anything is dispatched:
        // a criterion the empty aggregate already satisfies completes
        // without touching the cluster.
        if ObserveItem::default().check(persist_to, replicate_to) {
            debug!(id, "durability criterion trivially satisfied");
            return Ok(true);
        }

        let swallow_errors = retry.should_retry_observe();
        let mut attempt: u32 = 0;

        loop {
            let num_replicas = self
                .replica_count(bucket, persist_to, replicate_to)
                .await?;

            let mut probes = JoinSet::new();
            self.spawn_probe(&mut probes, bucket, id, cas, true, 0);
            if persist_to.touches_replica() || replicate_to.touches_replica() {
                for index in 1..=num_replicas {
                    self.spawn_probe(&mut probes, bucket, id, cas, false, index as u16);
                }
            }

            let mut state = ObserveItem::default();
            let mut round_error: Option<FacadeError> = None;
            while let Some(joined) = probes.join_next().await {
                let response = match joined {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        if swallow_errors {
                            debug!(id, %e, "observe probe failed, node skipped this round");
                        } else if round_error.is_none() {
                            // Probes join in completion order, so the error
                            // is held until the round's remaining probes
                            // have had their chance to satisfy the
                            // criterion first.
                            round_error = Some(e);
                        }
                        continue;
                    }
                    Err(e) => {
                        warn!(id, %e, "observe probe task panicked");
                        continue;
                    }
                };

                let item = ObserveItem::from_response(
                    id,
                    response,
                    cas,
                    remove,
                    persist_identifier,
                    replica_identifier,
                )?;
                state = state.add(item);
                if state.check(persist_to, replicate_to) {
                    debug!(id, %state, "durability criterion satisfied");
                    return Ok(true);
                }
            }

            if let Some(e) = round_error {
                return Err(e.into());
            }

            attempt += 1;
            let pause = delay.calculate(attempt);
            debug!(id, attempt, ?pause, %state, "criterion not met, repeating after delay");
            sleep(pause).await;
        }
    }

    fn spawn_probe(
        &self,
        probes: &mut JoinSet<Result<ObserveResponse, FacadeError>>,
        bucket: &str,
        id: &str,
        cas: u64,
        master: bool,
        replica_index: u16,
    ) {
        let facade = self.facade.clone();
        let request = ObserveRequest {
            id: id.to_string(),
            cas,
            master,
            replica_index,
            bucket: bucket.to_string(),
        };
        probes.spawn(async move { facade.observe(request).await });
    }

    /// Fetch the current replica count for the bucket and validate the
    /// criterion against it. Runs once per round: topology may change
    /// while the loop is polling.
    async fn replica_count(
        &self,
        bucket: &str,
        persist_to: PersistTo,
        replicate_to: ReplicateTo,
    ) -> Result<u32, ObserveError> {
        let response = self.facade.get_cluster_config().await?;
        let config = response
            .config
            .bucket(bucket)
            .ok_or_else(|| ObserveError::UnknownBucket(bucket.to_string()))?;
        let configured = config.num_replicas;

        if replicate_to.touches_replica() && replicate_to.value() > configured {
            return Err(ObserveError::ReplicaNotConfigured {
                bucket: bucket.to_string(),
                needed: replicate_to.value(),
                configured,
            });
        }
        if persist_to.touches_replica() && persist_to.value() - 1 > configured {
            return Err(ObserveError::ReplicaNotConfigured {
                bucket: bucket.to_string(),
                needed: persist_to.value() - 1,
                configured,
            });
        }
        Ok(configured)
    }
}
