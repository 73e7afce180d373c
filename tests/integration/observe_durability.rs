//! Integration tests: durability observation.

use std::sync::Arc;
use std::time::Duration;

use reef_integration_tests::{bucket_with, cluster_of, init_tracing, kv_node};
use reef_observe::{
    BestEffortRetry, DurabilityObserver, FixedDelay, ObserveError, PersistTo, ReplicateTo,
};
use reef_proto::ObserveStatus;
use reef_proto::mock::{MockFacade, ObserveReply};
use tokio::time::sleep;

const CAS: u64 = 0xCAFE;

fn wired(replicas: u32) -> (Arc<MockFacade>, DurabilityObserver) {
    let mock = Arc::new(MockFacade::new());
    mock.set_cluster_config(cluster_of([bucket_with(
        "bucket",
        vec![kv_node("localhost:8091")],
        replicas,
    )]));
    let observer = DurabilityObserver::new(mock.clone());
    (mock, observer)
}

async fn observe(
    observer: &DurabilityObserver,
    cas: u64,
    remove: bool,
    persist_to: PersistTo,
    replicate_to: ReplicateTo,
) -> Result<bool, ObserveError> {
    observer
        .observe(
            "bucket",
            "doc",
            cas,
            remove,
            persist_to,
            replicate_to,
            &FixedDelay::new(Duration::from_millis(10)),
            &BestEffortRetry,
        )
        .await
}

/// Master reports the mutation persisted with the expected CAS: the
/// aggregate becomes (0, 1, master) and persist-to-one is satisfied.
#[tokio::test]
async fn test_observe_persist_to_one() {
    init_tracing();
    let (mock, observer) = wired(0);
    mock.script_master([ObserveReply::status(ObserveStatus::FoundPersisted, CAS)]);

    let ok = observe(&observer, CAS, false, PersistTo::One, ReplicateTo::None)
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(mock.observe_requests().len(), 1);
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// A diverged CAS on the active copy aborts the whole operation.
#[tokio::test]
async fn test_observe_cas_divergence() {
    init_tracing();
    let (mock, observer) = wired(0);
    mock.script_master([ObserveReply::status(ObserveStatus::FoundPersisted, CAS + 1)]);

    let err = observe(&observer, CAS, false, PersistTo::One, ReplicateTo::None)
        .await
        .unwrap_err();

    assert!(matches!(err, ObserveError::ConcurrentlyModified { .. }));
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// With no criterion at all, the empty aggregate already satisfies the
/// check and the future resolves without any cluster traffic.
#[tokio::test]
async fn test_observe_none_none_is_immediate() {
    let (mock, observer) = wired(0);

    let ok = observe(&observer, CAS, false, PersistTo::None, ReplicateTo::None)
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(mock.cluster_config_requests(), 0);
    assert_eq!(mock.observe_requests().len(), 0);
}

/// Delete confirmation: a persisted deletion reports CAS 0 and is
/// accepted even though the expected CAS is non-zero.
#[tokio::test]
async fn test_observe_remove_accepts_cas_zero() {
    let (mock, observer) = wired(0);
    mock.script_master([ObserveReply::status(ObserveStatus::NotFoundPersisted, 0)]);

    let ok = observe(&observer, CAS, true, PersistTo::Master, ReplicateTo::None)
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// The criterion can require more replicas than the bucket has; that is
/// surfaced before any probe is dispatched.
#[tokio::test]
async fn test_observe_replica_under_provisioning() {
    let (mock, observer) = wired(1);

    let err = observe(&observer, CAS, false, PersistTo::None, ReplicateTo::Two)
        .await
        .unwrap_err();

    assert!(matches!(err, ObserveError::ReplicaNotConfigured { .. }));
    assert_eq!(mock.observe_requests().len(), 0);
}

/// Full criterion across a replicated bucket: the loop keeps polling
/// until every required node has caught up.
#[tokio::test(start_paused = true)]
async fn test_observe_converges_over_multiple_rounds() {
    init_tracing();
    let (mock, observer) = wired(2);
    mock.script_master([ObserveReply::status(ObserveStatus::FoundPersisted, CAS)]);
    // Replica 1 persists immediately; replica 2 is in memory only for two
    // rounds, then persists.
    mock.script_replica(1, [ObserveReply::status(ObserveStatus::FoundPersisted, CAS)]);
    mock.script_replica(
        2,
        [
            ObserveReply::status(ObserveStatus::FoundNotPersisted, CAS),
            ObserveReply::status(ObserveStatus::FoundNotPersisted, CAS),
            ObserveReply::status(ObserveStatus::FoundPersisted, CAS),
        ],
    );

    let ok = observe(&observer, CAS, false, PersistTo::Three, ReplicateTo::Two)
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(
        mock.cluster_config_requests(),
        3,
        "three rounds, config re-fetched each"
    );
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// Dropping the observe future (caller timeout) stops the loop and every
/// buffer handed out so far still ends released.
#[tokio::test(start_paused = true)]
async fn test_observe_caller_timeout_releases_buffers() {
    let (mock, observer) = wired(0);
    // The mutation never persists, so the criterion is never met.
    mock.script_master([ObserveReply::status(ObserveStatus::FoundNotPersisted, CAS)]);

    let result = tokio::time::timeout(
        Duration::from_millis(500),
        observe(&observer, CAS, false, PersistTo::One, ReplicateTo::None),
    )
    .await;

    assert!(result.is_err());
    sleep(Duration::from_millis(50)).await;
    assert!(mock.observe_requests().len() > 1, "the loop was repeating");
    assert_eq!(mock.outstanding_payloads(), 0);
}
