//! Scenario tests for the discovery-protocol transition coordinator.
//!
//! Exercises both annotation-backed state machines end to end: bootstrap
//! freezing across simulated controller restarts, and voting-exclusion
//! idempotency across repeated reconciliation passes.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use quorum_operator::client::fake::FakeDiscoveryClient;
use quorum_operator::crd::{ClusterRef, DataCluster, DataClusterSpec};
use quorum_operator::nodeset::{NodeSetResources, ResourcesList};
use quorum_operator::platform::fake::FakePlatform;
use quorum_operator::settings::INITIAL_MASTER_NODES;
use quorum_operator::testing::{TestPod, TestWorkloadSet};
use quorum_operator::transition::state::{
    INITIAL_MASTER_NODES_ANNOTATION, VOTING_EXCLUSIONS_ANNOTATION,
};
use quorum_operator::transition::{
    add_voting_exclusions, clear_bootstrap_annotation, clear_voting_exclusions,
    setup_initial_masters,
};
use quorum_operator::workload::WorkloadSetList;

fn data_cluster(version: &str, annotations: BTreeMap<String, String>) -> DataCluster {
    DataCluster {
        metadata: ObjectMeta {
            name: Some("my-cluster".to_string()),
            namespace: Some("ns".to_string()),
            annotations: if annotations.is_empty() {
                None
            } else {
                Some(annotations)
            },
            ..Default::default()
        },
        spec: DataClusterSpec {
            version: version.to_string(),
            node_sets: Vec::new(),
        },
        status: None,
    }
}

fn master_resources(replicas: i32) -> ResourcesList {
    ResourcesList::from(vec![NodeSetResources::new(
        TestWorkloadSet::new("my-cluster", "master").replicas(replicas).master().build(),
    )])
}

/// The full bootstrap lifecycle: compute, freeze, survive a "restart" with a
/// grown topology, confirm, clear.
#[tokio::test]
async fn test_bootstrap_lifecycle_freezes_across_restarts() {
    let cluster_ref = ClusterRef::new("ns", "my-cluster");
    let platform = FakePlatform::new();
    let discovery = FakeDiscoveryClient::new();

    // pass 1: new cluster, 3 declared masters
    let cluster = data_cluster("7.5.0", BTreeMap::new());
    let mut resources = master_resources(3);
    setup_initial_masters(&platform, &cluster, &mut resources)
        .await
        .unwrap();
    let frozen = platform.annotations(&cluster_ref)[INITIAL_MASTER_NODES_ANNOTATION].clone();
    assert_eq!(frozen, "master-0,master-1,master-2");

    // pass 2 (after a controller restart): the user scaled masters to 5, but
    // the frozen value must be reproduced exactly, never recomputed
    let cluster = data_cluster("7.5.0", platform.annotations(&cluster_ref));
    let mut resources = master_resources(5);
    setup_initial_masters(&platform, &cluster, &mut resources)
        .await
        .unwrap();
    assert_eq!(
        resources
            .config_for("master")
            .and_then(|c| c.get(INITIAL_MASTER_NODES))
            .cloned(),
        Some(serde_json::json!(["master-0", "master-1", "master-2"]))
    );
    assert_eq!(
        platform.annotations(&cluster_ref)[INITIAL_MASTER_NODES_ANNOTATION],
        frozen
    );

    // pass 3: protocol not yet formed, the annotation stays
    discovery.set_bootstrapped(false);
    let retry = clear_bootstrap_annotation(&platform, &discovery, &cluster)
        .await
        .unwrap();
    assert!(retry);
    assert!(platform
        .annotations(&cluster_ref)
        .contains_key(INITIAL_MASTER_NODES_ANNOTATION));

    // pass 4: formed, annotation deleted
    discovery.set_bootstrapped(true);
    let retry = clear_bootstrap_annotation(&platform, &discovery, &cluster)
        .await
        .unwrap();
    assert!(!retry);
    assert!(!platform
        .annotations(&cluster_ref)
        .contains_key(INITIAL_MASTER_NODES_ANNOTATION));
}

/// Repeated add calls with the same node set hit the live API at most once.
#[tokio::test]
async fn test_add_exclusions_idempotent_across_passes() {
    let cluster_ref = ClusterRef::new("ns", "my-cluster");
    let platform = FakePlatform::new();
    for i in 0..3 {
        platform.add_pod(TestPod::new("my-cluster", "master", i).master().version("7.5.0").build());
    }
    let discovery = FakeDiscoveryClient::new();

    let excluded = vec!["master-2".to_string()];
    let cluster = data_cluster("7.5.0", BTreeMap::new());
    add_voting_exclusions(&platform, &discovery, &cluster, &excluded)
        .await
        .unwrap();
    assert_eq!(discovery.added_exclusions().len(), 1);

    // next pass reloads the cluster with the persisted annotation
    let cluster = data_cluster("7.5.0", platform.annotations(&cluster_ref));
    add_voting_exclusions(&platform, &discovery, &cluster, &excluded)
        .await
        .unwrap();
    assert_eq!(discovery.added_exclusions().len(), 1);
}

/// Clearing is gated on pod reconciliation, then persists the empty marker;
/// a later pass short-circuits on it.
#[tokio::test]
async fn test_clear_exclusions_across_passes() {
    let cluster_ref = ClusterRef::new("ns", "my-cluster");
    let platform = FakePlatform::new();
    for i in 0..3 {
        platform.add_pod(TestPod::new("my-cluster", "master", i).master().version("7.5.0").build());
    }
    let discovery = FakeDiscoveryClient::new();
    let sets = WorkloadSetList::from(vec![
        TestWorkloadSet::new("my-cluster", "master").replicas(3).master().build(),
    ]);

    // pass 1: a downscaled pod is still around, clearing must wait
    platform.add_pod(TestPod::new("my-cluster", "master", 3).master().version("7.5.0").build());
    let mut annotations = BTreeMap::new();
    annotations.insert(VOTING_EXCLUSIONS_ANNOTATION.to_string(), "master-3".to_string());
    let cluster = data_cluster("7.5.0", annotations);
    let retry = clear_voting_exclusions(&platform, &discovery, &cluster, &sets)
        .await
        .unwrap();
    assert!(retry);
    assert!(discovery.delete_exclusion_calls().is_empty());

    // pass 2: the pod is gone, exclusions are cleared and confirmed
    platform.remove_pod("master-3");
    let retry = clear_voting_exclusions(&platform, &discovery, &cluster, &sets)
        .await
        .unwrap();
    assert!(!retry);
    assert_eq!(discovery.delete_exclusion_calls(), vec![false]);
    assert_eq!(platform.annotations(&cluster_ref)[VOTING_EXCLUSIONS_ANNOTATION], "");

    // pass 3: confirmed cleared, nothing more goes out
    let cluster = data_cluster("7.5.0", platform.annotations(&cluster_ref));
    let retry = clear_voting_exclusions(&platform, &discovery, &cluster, &sets)
        .await
        .unwrap();
    assert!(!retry);
    assert_eq!(discovery.delete_exclusion_calls().len(), 1);
}

/// Input order never changes what is persisted, and the caller's slice is
/// not mutated.
#[tokio::test]
async fn test_exclusion_normalization() {
    let cluster_ref = ClusterRef::new("ns", "my-cluster");
    let platform = FakePlatform::new();
    for i in 0..3 {
        platform.add_pod(TestPod::new("my-cluster", "master", i).master().version("7.5.0").build());
    }
    let discovery = FakeDiscoveryClient::new();

    let input = vec![
        "nodeA".to_string(),
        "nodeC".to_string(),
        "nodeB".to_string(),
    ];
    let cluster = data_cluster("7.5.0", BTreeMap::new());
    add_voting_exclusions(&platform, &discovery, &cluster, &input)
        .await
        .unwrap();

    assert_eq!(input, vec!["nodeA", "nodeC", "nodeB"]);
    assert_eq!(
        platform.annotations(&cluster_ref)[VOTING_EXCLUSIONS_ANNOTATION],
        "nodeA,nodeB,nodeC"
    );
}
