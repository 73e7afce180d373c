//! Integration tests: one-shot refresh with cross-node failover.

use std::sync::Arc;
use std::time::Duration;

use reef_integration_tests::{
    CONFIG_BODY, bare_node, bucket_with, cluster_of, init_tracing, kv_node, one_node_bucket,
};
use reef_proto::KeyValueStatus;
use reef_proto::mock::{ConfigReply, MockFacade};
use reef_refresh::{CarrierRefresher, RecordingProvider};
use tokio::time::sleep;

fn wired(mock: &Arc<MockFacade>) -> (CarrierRefresher, Arc<RecordingProvider>) {
    let refresher = CarrierRefresher::new(mock.clone());
    refresher.register_bucket("bucket", "");
    let provider = Arc::new(RecordingProvider::new());
    refresher.provider(provider.clone());
    (refresher, provider)
}

/// A healthy single-node cluster refreshes on the first request.
#[tokio::test(start_paused = true)]
async fn test_refresh_with_valid_cluster_config() {
    init_tracing();
    let mock = Arc::new(MockFacade::new());
    mock.queue_config_replies([ConfigReply::success(CONFIG_BODY)]);
    let (refresher, provider) = wired(&mock);

    refresher.refresh(&cluster_of([one_node_bucket("bucket")]));
    sleep(Duration::from_millis(200)).await;

    assert_eq!(
        provider.proposals(),
        vec![("bucket".to_string(), CONFIG_BODY.to_string())]
    );
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// Delivered-but-failed responses are not proposed; the buffer is still
/// released.
#[tokio::test(start_paused = true)]
async fn test_refresh_with_invalid_cluster_config() {
    let mock = Arc::new(MockFacade::new());
    mock.queue_config_replies([ConfigReply::failure(KeyValueStatus::ErrNotFound, "")]);
    let (refresher, provider) = wired(&mock);

    refresher.refresh(&cluster_of([one_node_bucket("bucket")]));
    sleep(Duration::from_millis(200)).await;

    assert_eq!(provider.proposal_count(), 0);
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// First node errors, second answers: the refresh fails over and the
/// provider sees exactly one proposal.
#[tokio::test(start_paused = true)]
async fn test_refresh_falls_back_to_next_on_error() {
    init_tracing();
    let mock = Arc::new(MockFacade::new());
    mock.queue_config_replies([
        ConfigReply::error("connection refused"),
        ConfigReply::success(CONFIG_BODY),
    ]);
    let (refresher, provider) = wired(&mock);

    let cluster = cluster_of([bucket_with(
        "bucket",
        vec![kv_node("1.2.3.4:8091"), kv_node("2.3.4.5:8091")],
        0,
    )]);
    refresher.refresh(&cluster);
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(
        provider.proposals(),
        vec![("bucket".to_string(), CONFIG_BODY.to_string())]
    );
    let hosts: Vec<String> = mock
        .config_requests()
        .iter()
        .map(|r| r.hostname.clone())
        .collect();
    assert_eq!(hosts, ["1.2.3.4:8091", "2.3.4.5:8091"]);
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// A node without the key-value service is never selected at all.
#[tokio::test(start_paused = true)]
async fn test_refresh_skips_node_without_kv_service() {
    let mock = Arc::new(MockFacade::new());
    mock.queue_config_replies([
        ConfigReply::error("connection refused"),
        ConfigReply::success(CONFIG_BODY),
    ]);
    let (refresher, provider) = wired(&mock);

    let cluster = cluster_of([bucket_with(
        "bucket",
        vec![
            kv_node("1.2.3.4:8091"),
            bare_node("6.7.8.9:8091"),
            kv_node("2.3.4.5:8091"),
        ],
        0,
    )]);
    refresher.refresh(&cluster);
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(provider.proposal_count(), 1);
    let hosts: Vec<String> = mock
        .config_requests()
        .iter()
        .map(|r| r.hostname.clone())
        .collect();
    assert_eq!(hosts, ["1.2.3.4:8091", "2.3.4.5:8091"]);
    assert!(
        !hosts.iter().any(|h| h == "6.7.8.9:8091"),
        "the KV-less node must never be contacted"
    );
    assert_eq!(mock.outstanding_payloads(), 0);
}

/// Buckets refresh independently: one failing bucket does not block the
/// other.
#[tokio::test(start_paused = true)]
async fn test_refresh_handles_buckets_independently() {
    let mock = Arc::new(MockFacade::new());
    // Bucket "a" is enumerated first; its node errors. Bucket "b" succeeds.
    mock.queue_config_replies([
        ConfigReply::error("down"),
        ConfigReply::success(CONFIG_BODY),
    ]);
    let (refresher, provider) = wired(&mock);

    let cluster = cluster_of([
        bucket_with("a", vec![kv_node("1.1.1.1:8091")], 0),
        bucket_with("b", vec![kv_node("2.2.2.2:8091")], 0),
    ]);
    refresher.refresh(&cluster);
    sleep(Duration::from_millis(200)).await;

    let proposals = provider.proposals();
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].1, CONFIG_BODY);
    assert_eq!(mock.outstanding_payloads(), 0);
}
