//! Well-known labels and annotations on managed resources.
//!
//! Every workload set and pod belonging to a DataCluster carries labels
//! identifying its cluster, node set, version, and role flags. These are the
//! selector keys used for all platform reads (cluster name, node-set name,
//! role flags, version).

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use semver::Version;

use crate::crd::NodeRoles;
use crate::error::{Error, Result};

/// Label carrying the DataCluster name on owned resources
pub const CLUSTER_NAME_LABEL: &str = "datacluster.quorumoperator.dev/cluster-name";
/// Label carrying the node set name on owned resources
pub const NODESET_NAME_LABEL: &str = "datacluster.quorumoperator.dev/nodeset-name";
/// Label carrying the declared data-cluster version of a node
pub const VERSION_LABEL: &str = "datacluster.quorumoperator.dev/version";
/// Label set to "true" on master-eligible nodes
pub const NODE_MASTER_LABEL: &str = "datacluster.quorumoperator.dev/node-master";
/// Label set to "true" on data nodes
pub const NODE_DATA_LABEL: &str = "datacluster.quorumoperator.dev/node-data";
/// Label set to "true" on ingest nodes
pub const NODE_INGEST_LABEL: &str = "datacluster.quorumoperator.dev/node-ingest";

/// Annotation set on the DataCluster by the surrounding framework once the
/// cluster has formed and reported an identity. Consumed here as the "has
/// this cluster ever formed" signal; never written by this subsystem.
pub const CLUSTER_UUID_ANNOTATION: &str = "datacluster.quorumoperator.dev/cluster-uuid";

fn has_true_label(labels: Option<&BTreeMap<String, String>>, key: &str) -> bool {
    labels
        .and_then(|l| l.get(key))
        .is_some_and(|v| v == "true")
}

/// Returns true if the pod carries the master-eligible role label.
pub fn is_master_node(pod: &Pod) -> bool {
    has_true_label(pod.metadata.labels.as_ref(), NODE_MASTER_LABEL)
}

fn template_labels(sset: &StatefulSet) -> Option<&BTreeMap<String, String>> {
    sset.spec
        .as_ref()
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.labels.as_ref())
}

/// Returns true if the given workload set declares master-eligible nodes.
pub fn is_master_node_set(sset: &StatefulSet) -> bool {
    has_true_label(template_labels(sset), NODE_MASTER_LABEL)
}

/// Returns true if the given workload set declares data nodes.
pub fn is_data_node_set(sset: &StatefulSet) -> bool {
    has_true_label(template_labels(sset), NODE_DATA_LABEL)
}

/// Returns true if the given workload set declares ingest nodes.
pub fn is_ingest_node_set(sset: &StatefulSet) -> bool {
    has_true_label(template_labels(sset), NODE_INGEST_LABEL)
}

/// Keep only master-eligible pods.
pub fn filter_master_pods(pods: &[Pod]) -> Vec<Pod> {
    pods.iter().filter(|p| is_master_node(p)).cloned().collect()
}

/// Extract the data-cluster version from a label map.
///
/// Returns an error if the label is absent or does not parse: callers decide
/// whether that is fatal or fail-closed (see `compat`).
pub fn extract_version(labels: Option<&BTreeMap<String, String>>) -> Result<Version> {
    let value = labels
        .and_then(|l| l.get(VERSION_LABEL))
        .ok_or_else(|| Error::MissingVersion(VERSION_LABEL.to_string()))?;
    parse_version(value)
}

/// Parse a version string as carried in the version label.
pub fn parse_version(value: &str) -> Result<Version> {
    Version::parse(value).map_err(|source| Error::InvalidVersion {
        value: value.to_string(),
        source,
    })
}

/// Version declared by a workload set's pod template, if any.
pub fn node_set_version(sset: &StatefulSet) -> Result<Version> {
    extract_version(template_labels(sset))
}

/// Version of an individual pod.
pub fn pod_version(pod: &Pod) -> Result<Version> {
    extract_version(pod.metadata.labels.as_ref())
}

/// Build the full label map for the nodes of one node set.
///
/// Used by the outer reconciler when rendering workload sets, and by test
/// fixtures; kept here so the selector keys and the written keys cannot
/// drift apart.
pub fn node_set_labels(
    cluster_name: &str,
    set_name: &str,
    version: &str,
    roles: NodeRoles,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(CLUSTER_NAME_LABEL.to_string(), cluster_name.to_string());
    labels.insert(NODESET_NAME_LABEL.to_string(), set_name.to_string());
    labels.insert(VERSION_LABEL.to_string(), version.to_string());
    labels.insert(NODE_MASTER_LABEL.to_string(), roles.master.to_string());
    labels.insert(NODE_DATA_LABEL.to_string(), roles.data.to_string());
    labels.insert(NODE_INGEST_LABEL.to_string(), roles.ingest.to_string());
    labels
}

/// Label selector matching every resource of the given cluster.
pub fn cluster_selector(cluster_name: &str) -> String {
    format!("{}={}", CLUSTER_NAME_LABEL, cluster_name)
}

/// Label selector matching every pod of one node set.
pub fn node_set_selector(cluster_name: &str, set_name: &str) -> String {
    format!(
        "{}={},{}={}",
        CLUSTER_NAME_LABEL, cluster_name, NODESET_NAME_LABEL, set_name
    )
}

/// Label selector matching every master-eligible pod of the given cluster.
pub fn master_selector(cluster_name: &str) -> String {
    format!(
        "{}={},{}=true",
        CLUSTER_NAME_LABEL, cluster_name, NODE_MASTER_LABEL
    )
}
