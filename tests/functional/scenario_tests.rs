//! Scenario tests for quorum coordination across mixed fleets.
//!
//! Each test seeds the fakes with one concrete fleet shape and verifies the
//! full decision: which configurations get patched, which live calls go out,
//! and what is asked to be retried.

use quorum_operator::client::fake::FakeDiscoveryClient;
use quorum_operator::crd::ClusterRef;
use quorum_operator::nodeset::{NodeSetResources, ResourcesList};
use quorum_operator::platform::fake::FakePlatform;
use quorum_operator::quorum;
use quorum_operator::settings::DISCOVERY_MINIMUM_MASTERS;
use quorum_operator::testing::{TestPod, TestWorkloadSet};
use quorum_operator::workload::{WorkloadSetList, retrieve_workload_sets};

fn cluster() -> ClusterRef {
    ClusterRef::new("ns", "my-cluster")
}

fn minimum_masters(resources: &ResourcesList, set_name: &str) -> Option<serde_json::Value> {
    resources
        .config_for(set_name)
        .and_then(|c| c.get(DISCOVERY_MINIMUM_MASTERS))
        .cloned()
}

/// 3 master-only + 3 master-data + 3 data-only node sets, all legacy: the
/// static quorum lands in the first two groups with value 4 (6 masters),
/// the data-only group's configuration is untouched.
#[tokio::test]
async fn test_static_quorum_three_groups() {
    let mut resources = ResourcesList::from(vec![
        NodeSetResources::new(
            TestWorkloadSet::new("my-cluster", "master")
                .replicas(3)
                .master()
                .version("6.8.5")
                .build(),
        ),
        NodeSetResources::new(
            TestWorkloadSet::new("my-cluster", "masterdata")
                .replicas(3)
                .master()
                .data()
                .version("6.8.5")
                .build(),
        ),
        NodeSetResources::new(
            TestWorkloadSet::new("my-cluster", "data")
                .replicas(3)
                .data()
                .version("6.8.5")
                .build(),
        ),
    ]);
    let platform = FakePlatform::new();

    quorum::setup_minimum_masters_config(&platform, &cluster(), &mut resources)
        .await
        .unwrap();

    assert_eq!(minimum_masters(&resources, "master"), Some(serde_json::json!(4)));
    assert_eq!(
        minimum_masters(&resources, "masterdata"),
        Some(serde_json::json!(4))
    );
    assert_eq!(minimum_masters(&resources, "data"), None);
}

/// 2 ready masters out of 2 total: the live quorum call is issued with
/// target 2.
#[tokio::test]
async fn test_live_quorum_all_masters_ready() {
    let platform = FakePlatform::new();
    for i in 0..2 {
        platform.add_pod(
            TestPod::new("my-cluster", "master", i)
                .master()
                .version("6.8.5")
                .ready()
                .build(),
        );
    }
    let sets = WorkloadSetList::from(vec![
        TestWorkloadSet::new("my-cluster", "master")
            .replicas(2)
            .master()
            .version("6.8.5")
            .build(),
    ]);
    let discovery = FakeDiscoveryClient::new();

    let retry = quorum::update_minimum_masters(&platform, &discovery, &cluster(), &sets)
        .await
        .unwrap();

    assert!(!retry);
    assert_eq!(discovery.minimum_master_calls(), vec![2]);
}

/// 1 ready master out of 3 total: no live call, retry later.
#[tokio::test]
async fn test_live_quorum_not_enough_ready_masters() {
    let platform = FakePlatform::new();
    platform.add_pod(
        TestPod::new("my-cluster", "master", 0)
            .master()
            .version("6.8.5")
            .ready()
            .build(),
    );
    for i in 1..3 {
        platform.add_pod(TestPod::new("my-cluster", "master", i).master().version("6.8.5").build());
    }
    let sets = WorkloadSetList::from(vec![
        TestWorkloadSet::new("my-cluster", "master")
            .replicas(3)
            .master()
            .version("6.8.5")
            .build(),
    ]);
    let discovery = FakeDiscoveryClient::new();

    let retry = quorum::update_minimum_masters(&platform, &discovery, &cluster(), &sets)
        .await
        .unwrap();

    assert!(retry);
    assert!(discovery.minimum_master_calls().is_empty());
}

/// Specs already upgraded to modern versions while legacy masters still run:
/// the legacy gate must look at pods too, and keep patching.
#[tokio::test]
async fn test_static_quorum_specs_lag_reality_mid_rollout() {
    let mut resources = ResourcesList::from(vec![NodeSetResources::new(
        TestWorkloadSet::new("my-cluster", "master")
            .replicas(3)
            .master()
            .version("7.5.0")
            .build(),
    )]);
    let platform = FakePlatform::new();
    for i in 0..3 {
        platform.add_pod(TestPod::new("my-cluster", "master", i).master().version("6.8.5").build());
    }

    quorum::setup_minimum_masters_config(&platform, &cluster(), &mut resources)
        .await
        .unwrap();

    // the check passes because legacy masters run, but the modern node set's
    // configuration must not carry the legacy setting
    assert_eq!(minimum_masters(&resources, "master"), None);
}

/// Retrieval orders workload sets by name so downstream algorithms are
/// deterministic across passes.
#[tokio::test]
async fn test_workload_set_retrieval_is_ordered() {
    let platform = FakePlatform::new().with_workload_sets(vec![
        TestWorkloadSet::new("my-cluster", "zeta").replicas(1).build(),
        TestWorkloadSet::new("my-cluster", "alpha").replicas(1).build(),
        TestWorkloadSet::new("other", "unrelated").replicas(1).build(),
    ]);

    let sets = retrieve_workload_sets(&platform, &cluster()).await.unwrap();

    assert_eq!(
        sets.names().into_iter().collect::<Vec<_>>(),
        vec!["alpha", "zeta"]
    );
}

/// 3/3 expected pods present: reconciliation done with an empty reason;
/// removing one pod flips it to not-done with a human-readable reason.
#[tokio::test]
async fn test_pod_reconciliation_round_trip() {
    let platform = FakePlatform::new();
    for i in 0..3 {
        platform.add_pod(TestPod::new("my-cluster", "data", i).data().build());
    }
    let sets = WorkloadSetList::from(vec![
        TestWorkloadSet::new("my-cluster", "data").replicas(3).data().build(),
    ]);

    let (done, reason) = sets.pod_reconciliation_done(&platform, &cluster()).await.unwrap();
    assert!(done);
    assert_eq!(reason, "");

    platform.remove_pod("data-1");
    let (done, reason) = sets.pod_reconciliation_done(&platform, &cluster()).await.unwrap();
    assert!(!done);
    assert!(!reason.is_empty());
    assert!(reason.contains("data-1"));
}

/// Upstream discovery failures propagate unchanged; nothing is retried
/// in-process.
#[tokio::test]
async fn test_discovery_failure_propagates() {
    let platform = FakePlatform::new();
    for i in 0..2 {
        platform.add_pod(
            TestPod::new("my-cluster", "master", i)
                .master()
                .version("6.8.5")
                .ready()
                .build(),
        );
    }
    let sets = WorkloadSetList::from(vec![
        TestWorkloadSet::new("my-cluster", "master")
            .replicas(2)
            .master()
            .version("6.8.5")
            .build(),
    ]);
    let discovery = FakeDiscoveryClient::new();
    discovery.fail_requests(true);

    let err = quorum::update_minimum_masters(&platform, &discovery, &cluster(), &sets)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(discovery.minimum_master_calls(), Vec::<i32>::new());
}
